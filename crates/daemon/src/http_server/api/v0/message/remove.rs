use axum::extract::{Json, Query, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::IdentityId;

use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// Delete the caller's own message on a tile
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteMessageRequest {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMessageResponse {
    pub owner_id: IdentityId,
    pub x_coord: i64,
    pub y_coord: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Query(req): Query<DeleteMessageRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .tiles()
        .delete_message(req.owner_id, req.x_coord, req.y_coord, caller.id())
        .await?;

    Ok(Json(DeleteMessageResponse {
        owner_id: req.owner_id,
        x_coord: req.x_coord,
        y_coord: req.y_coord,
    }))
}

impl ApiRequest for DeleteMessageRequest {
    type Response = DeleteMessageResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/message")?;
        Ok(client.delete(full_url).query(&self))
    }
}
