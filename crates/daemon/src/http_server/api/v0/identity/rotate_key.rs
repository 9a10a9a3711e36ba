use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::database::models::Identity;
use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// Replace the caller's published public key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateKeyRequest {
    pub public_key: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Json(req): Json<RotateKeyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = state
        .identities()
        .rotate_key(caller.id(), &req.public_key)
        .await?;
    Ok(Json(identity))
}

impl ApiRequest for RotateKeyRequest {
    type Response = Identity;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/identity/key")?;
        Ok(client.put(full_url).json(&self))
    }
}
