use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::crypto::SealedFor;
use common::types::IdentityId;

use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// A message already sealed for each recipient by the sender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub owner_id: IdentityId,
    pub x_coord: i64,
    pub y_coord: i64,
    pub message_set: Vec<SealedFor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageResponse {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let message = state
        .tiles()
        .create_message(
            req.owner_id,
            req.x_coord,
            req.y_coord,
            &req.message_set,
            caller.id(),
        )
        .await?;

    Ok((
        http::StatusCode::CREATED,
        Json(CreateMessageResponse { id: message.id }),
    ))
}

impl ApiRequest for CreateMessageRequest {
    type Response = CreateMessageResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/message")?;
        Ok(client.post(full_url).json(&self))
    }
}
