use axum::routing::post;
use axum::Router;

use crate::ServiceState;

pub mod create;
pub mod read;
pub mod remove;

// Re-export for convenience
pub use create::{CreateMessageRequest, CreateMessageResponse};
pub use read::ReadMessagesRequest;
pub use remove::{DeleteMessageRequest, DeleteMessageResponse};

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route(
            "/",
            post(create::handler)
                .get(read::handler)
                .delete(remove::handler),
        )
        .with_state(state)
}
