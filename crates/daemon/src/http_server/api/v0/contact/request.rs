use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::{ContactList, IdentityId};

use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// Ask another identity to become a contact
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RequestContactRequest {
    /// Identity to send the request to
    #[arg(long = "id")]
    pub target_id: IdentityId,
}

/// Responds with the caller's contact list after the change
pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Json(req): Json<RequestContactRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.contacts().request(caller.id(), req.target_id).await?;
    let list = state.contacts().list_for(caller.id()).await?;
    Ok((http::StatusCode::CREATED, Json(list)))
}

impl ApiRequest for RequestContactRequest {
    type Response = ContactList;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/contact/request")?;
        Ok(client.post(full_url).json(&self))
    }
}
