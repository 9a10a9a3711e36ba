use axum::extract::{Json, Query, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::IdentityId;

use crate::database::models::ReceivedMessage;
use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// The caller's cryptograms on a tile. Reading marks them seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadMessagesRequest {
    pub owner_id: IdentityId,
    pub x_coord: i64,
    pub y_coord: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Query(req): Query<ReadMessagesRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let read = state
        .tiles()
        .read_messages(req.owner_id, req.x_coord, req.y_coord, caller.id())
        .await?;
    Ok(Json(read.messages))
}

impl ApiRequest for ReadMessagesRequest {
    type Response = Vec<ReceivedMessage>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/message")?;
        Ok(client.get(full_url).query(&self))
    }
}
