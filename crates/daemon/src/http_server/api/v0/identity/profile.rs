use axum::extract::{Json, Query, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::IdentityId;

use crate::database::models::Identity;
use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// Look up an identity by exactly one of id or username
#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ProfileRequest {
    /// Identity id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[arg(long, group = "selector")]
    pub id: Option<IdentityId>,

    /// Username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[arg(long, group = "selector")]
    pub username: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    _caller: Caller,
    Query(req): Query<ProfileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let identity = match (req.id, req.username.as_deref()) {
        (Some(id), None) => state.identities().get(id).await?,
        (None, Some(username)) => state.identities().get_by_username(username).await?,
        _ => {
            return Err(ServiceError::OutOfBounds(
                "give exactly one of id or username".into(),
            ))
        }
    };

    Ok(Json(identity))
}

impl ApiRequest for ProfileRequest {
    type Response = Identity;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/identity")?;
        Ok(client.get(full_url).query(&self))
    }
}
