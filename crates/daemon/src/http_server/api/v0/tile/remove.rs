use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteTileRequest {
    /// Tile id
    #[arg(long)]
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTileResponse {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.tiles().delete_tile(id, caller.id()).await?;
    Ok(Json(DeleteTileResponse { id }))
}

impl ApiRequest for DeleteTileRequest {
    type Response = DeleteTileResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/api/v0/tile/{}", self.id))?;
        Ok(client.delete(full_url))
    }
}
