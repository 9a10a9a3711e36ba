use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::IdentityId;

use crate::database::models::TileFields;
use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTileRequest {
    pub owner_id: IdentityId,
    pub x_coord: i64,
    pub y_coord: i64,
    #[serde(flatten)]
    pub fields: TileFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTileResponse {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Json(req): Json<CreateTileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tile = state
        .tiles()
        .create_tile(req.owner_id, req.x_coord, req.y_coord, req.fields, caller.id())
        .await?;

    Ok((
        http::StatusCode::CREATED,
        Json(CreateTileResponse { id: tile.id }),
    ))
}

impl ApiRequest for CreateTileRequest {
    type Response = CreateTileResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/tile")?;
        Ok(client.post(full_url).json(&self))
    }
}
