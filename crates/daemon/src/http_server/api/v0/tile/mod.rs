use axum::routing::{delete, post};
use axum::Router;

use crate::ServiceState;

pub mod create;
pub mod read;
pub mod remove;
pub mod update;

// Re-export for convenience
pub use create::{CreateTileRequest, CreateTileResponse};
pub use read::ReadTileRequest;
pub use remove::{DeleteTileRequest, DeleteTileResponse};
pub use update::UpdateTileRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(create::handler).get(read::handler))
        .route("/update", post(update::handler))
        .route("/:id", delete(remove::handler))
        .with_state(state)
}
