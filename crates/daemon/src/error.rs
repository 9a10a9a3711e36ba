use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use common::crypto::ComposeError;
use common::ErrorKind;

/// Failure of a contact, tile or message operation
///
/// One variant per [`ErrorKind`]. Handlers return these directly; the
/// response mapping below is the only place kinds become status codes.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("{0}")]
    AuthorizationDenied(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    OutOfBounds(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    CapacityExceeded(String),
    #[error("{0}")]
    Undeliverable(String),
    #[error("{0}")]
    DecryptionFailure(String),
    #[error("store error: {0}")]
    TransientStoreError(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            ServiceError::AuthorizationDenied(_) => ErrorKind::AuthorizationDenied,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::OutOfBounds(_) => ErrorKind::OutOfBounds,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::CapacityExceeded(_) => ErrorKind::CapacityExceeded,
            ServiceError::Undeliverable(_) => ErrorKind::Undeliverable,
            ServiceError::DecryptionFailure(_) => ErrorKind::DecryptionFailure,
            ServiceError::TransientStoreError(_) => ErrorKind::TransientStoreError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ErrorKind::AuthorizationDenied => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::OutOfBounds => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::CapacityExceeded => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Undeliverable => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::DecryptionFailure => StatusCode::BAD_REQUEST,
            ErrorKind::TransientStoreError => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub(crate) fn denied() -> Self {
        ServiceError::AuthorizationDenied("not the owner or an authorized contact".into())
    }
}

/// Client-facing text for store failures. The driver error is only logged.
pub(crate) const STORE_UNAVAILABLE: &str = "the store is temporarily unavailable";

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "store operation failed");
        ServiceError::TransientStoreError(STORE_UNAVAILABLE.into())
    }
}

impl From<ComposeError> for ServiceError {
    fn from(err: ComposeError) -> Self {
        match err.kind() {
            ErrorKind::DecryptionFailure => ServiceError::DecryptionFailure(err.to_string()),
            _ => ServiceError::Undeliverable(err.to_string()),
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = %self.kind(), "{}", self);
        } else {
            tracing::warn!(kind = %self.kind(), "{}", self);
        }
        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_maps_to_an_error_status() {
        let errors = [
            ServiceError::AuthenticationRequired,
            ServiceError::AuthorizationDenied(String::new()),
            ServiceError::NotFound(String::new()),
            ServiceError::OutOfBounds(String::new()),
            ServiceError::Conflict(String::new()),
            ServiceError::CapacityExceeded(String::new()),
            ServiceError::Undeliverable(String::new()),
            ServiceError::DecryptionFailure(String::new()),
            ServiceError::TransientStoreError(String::new()),
        ];
        for err in &errors {
            assert!(err.status().is_client_error() || err.status().is_server_error());
        }
        assert_eq!(
            ServiceError::AuthenticationRequired.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ServiceError::denied().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_store_errors_are_transient() {
        let err = ServiceError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::TransientStoreError);
    }

    #[tokio::test]
    async fn test_store_detail_stays_out_of_the_response() {
        let driver = sqlx::Error::ColumnNotFound("cryptograms.wrapped_key".into());
        let err = ServiceError::from(driver);
        assert!(!err.to_string().contains("wrapped_key"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.kind, ErrorKind::TransientStoreError);
        assert!(body.message.contains(STORE_UNAVAILABLE));
        assert!(!body.message.contains("wrapped_key"));
    }
}
