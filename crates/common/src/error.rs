use serde::{Deserialize, Serialize};

/// Stable failure kinds reported by every TileTalk operation.
///
/// Each kind is reported as-is to the caller; nothing is folded into a
/// generic failure on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthenticationRequired,
    AuthorizationDenied,
    NotFound,
    OutOfBounds,
    Conflict,
    CapacityExceeded,
    Undeliverable,
    DecryptionFailure,
    TransientStoreError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthenticationRequired => "authentication_required",
            ErrorKind::AuthorizationDenied => "authorization_denied",
            ErrorKind::NotFound => "not_found",
            ErrorKind::OutOfBounds => "out_of_bounds",
            ErrorKind::Conflict => "conflict",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::Undeliverable => "undeliverable",
            ErrorKind::DecryptionFailure => "decryption_failure",
            ErrorKind::TransientStoreError => "transient_store_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
