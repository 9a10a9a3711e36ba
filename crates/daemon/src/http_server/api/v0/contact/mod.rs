use axum::routing::{get, post};
use axum::Router;

use crate::ServiceState;

pub mod accept;
pub mod list;
pub mod remove;
pub mod request;

// Re-export for convenience
pub use accept::AcceptContactRequest;
pub use list::ListContactsRequest;
pub use remove::RemoveContactRequest;
pub use request::RequestContactRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler))
        .route("/request", post(request::handler))
        .route("/accept", post(accept::handler))
        .route("/remove", post(remove::handler))
        .with_state(state)
}
