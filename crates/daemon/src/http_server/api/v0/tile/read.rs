use axum::extract::{Json, Query, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::IdentityId;

use crate::database::models::Tile;
use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ReadTileRequest {
    /// Grid owner
    #[arg(long = "owner")]
    pub owner_id: IdentityId,

    /// Column, 0 to 3
    #[arg(short = 'x', long = "x")]
    pub x_coord: i64,

    /// Row, 0 to 3
    #[arg(short = 'y', long = "y")]
    pub y_coord: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Query(req): Query<ReadTileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tile = state
        .tiles()
        .read_tile(req.owner_id, req.x_coord, req.y_coord, caller.id())
        .await?;
    Ok(Json(tile))
}

impl ApiRequest for ReadTileRequest {
    type Response = Tile;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/tile")?;
        Ok(client.get(full_url).query(&self))
    }
}
