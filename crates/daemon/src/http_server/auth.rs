//! Caller authentication
//!
//! Credentials are issued elsewhere. The daemon only learns who is calling
//! through an [`Authenticator`] held in service state, and handlers only see
//! the result through the [`Caller`] extractor.

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use common::types::IdentityId;

use crate::database::models::Identity;
use crate::database::Database;
use crate::error::ServiceError;
use crate::ServiceState;

/// Header the fronting auth proxy sets to the authenticated identity id
pub const IDENTITY_HEADER: &str = "x-tiletalk-identity";

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// The identity behind a request, or None if it is unauthenticated
    async fn authenticate(&self, parts: &Parts) -> Option<IdentityId>;
}

/// Trusts [`IDENTITY_HEADER`] as long as it names a registered identity
#[derive(Debug, Clone)]
pub struct TrustedHeaderAuthenticator {
    db: Database,
}

impl TrustedHeaderAuthenticator {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Authenticator for TrustedHeaderAuthenticator {
    async fn authenticate(&self, parts: &Parts) -> Option<IdentityId> {
        let id = parts
            .headers
            .get(IDENTITY_HEADER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<IdentityId>()
            .ok()?;

        match Identity::exists(id, &self.db).await {
            Ok(true) => Some(id),
            Ok(false) => {
                tracing::debug!(id, "identity header names an unknown identity");
                None
            }
            Err(e) => {
                tracing::error!(id, error = %e, "identity lookup failed during authentication");
                None
            }
        }
    }
}

/// The authenticated identity making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub IdentityId);

impl Caller {
    pub fn id(&self) -> IdentityId {
        self.0
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for Caller {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        state
            .authenticator()
            .authenticate(parts)
            .await
            .map(Caller)
            .ok_or(ServiceError::AuthenticationRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = http::Request::builder().uri("/api/v0/contact");
        if let Some(value) = header {
            builder = builder.header(IDENTITY_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_trusted_header_resolves_known_identities_only() {
        let db = Database::in_memory().await.unwrap();
        let alice = Identity::create("alice", None, &db).await.unwrap();
        let auth = TrustedHeaderAuthenticator::new(db);

        let id = alice.id.to_string();
        assert_eq!(auth.authenticate(&parts_with(Some(&id))).await, Some(alice.id));
        assert_eq!(auth.authenticate(&parts_with(Some("9999"))).await, None);
        assert_eq!(auth.authenticate(&parts_with(Some("alice"))).await, None);
        assert_eq!(auth.authenticate(&parts_with(None)).await, None);
    }

    #[tokio::test]
    async fn test_caller_rejects_without_identity() {
        let state = ServiceState::in_memory().await.unwrap();
        let mut parts = parts_with(None);
        let rejection = Caller::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(rejection, ServiceError::AuthenticationRequired));
    }
}
