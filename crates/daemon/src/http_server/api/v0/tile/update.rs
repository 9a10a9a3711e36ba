use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::database::models::{Tile, TilePatch};
use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTileRequest {
    pub id: i64,
    #[serde(flatten)]
    pub patch: TilePatch,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Json(req): Json<UpdateTileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tile = state
        .tiles()
        .update_tile(req.id, req.patch, caller.id())
        .await?;
    Ok(Json(tile))
}

impl ApiRequest for UpdateTileRequest {
    type Response = Tile;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/tile/update")?;
        Ok(client.post(full_url).json(&self))
    }
}
