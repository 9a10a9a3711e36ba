use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::IdentityId;

use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// Delete the caller along with their edges, tiles and messages
#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct DeleteIdentityRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteIdentityResponse {
    pub id: IdentityId,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
) -> Result<impl IntoResponse, ServiceError> {
    state.identities().delete(caller.id()).await?;
    Ok(Json(DeleteIdentityResponse { id: caller.id() }))
}

impl ApiRequest for DeleteIdentityRequest {
    type Response = DeleteIdentityResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/identity")?;
        Ok(client.delete(full_url))
    }
}
