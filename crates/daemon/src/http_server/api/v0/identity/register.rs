use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::database::models::Identity;
use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    /// Base64 SPKI DER of the identity's RSA public key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Registration is the one unauthenticated call
pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = state
        .identities()
        .register(&req.username, req.public_key.as_deref())
        .await?;

    Ok((http::StatusCode::CREATED, Json(identity)))
}

impl ApiRequest for RegisterRequest {
    type Response = Identity;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/identity")?;
        Ok(client.post(full_url).json(&self))
    }
}
