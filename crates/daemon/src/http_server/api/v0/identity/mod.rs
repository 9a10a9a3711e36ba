use axum::routing::{post, put};
use axum::Router;

use crate::ServiceState;

pub mod delete;
pub mod profile;
pub mod register;
pub mod rotate_key;

// Re-export for convenience
pub use delete::{DeleteIdentityRequest, DeleteIdentityResponse};
pub use profile::ProfileRequest;
pub use register::RegisterRequest;
pub use rotate_key::RotateKeyRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route(
            "/",
            post(register::handler)
                .get(profile::handler)
                .delete(delete::handler),
        )
        .route("/key", put(rotate_key::handler))
        .with_state(state)
}
