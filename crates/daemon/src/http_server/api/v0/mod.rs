use axum::routing::get;
use axum::Router;

pub mod contact;
pub mod identity;
pub mod message;
pub mod tile;

use crate::http_server::live;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/identity", identity::router(state.clone()))
        .nest("/contact", contact::router(state.clone()))
        .nest("/tile", tile::router(state.clone()))
        .nest("/message", message::router(state.clone()))
        .route("/live", get(live::handler))
        .with_state(state)
}
