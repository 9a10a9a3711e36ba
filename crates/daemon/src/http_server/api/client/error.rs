use reqwest::StatusCode;

use common::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("{kind}: {message}")]
    Service { kind: ErrorKind, message: String },
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
}

impl ApiError {
    /// The daemon's error kind, if the daemon answered with one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Service { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
