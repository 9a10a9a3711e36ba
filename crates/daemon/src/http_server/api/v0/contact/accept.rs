use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::{ContactList, IdentityId};

use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// Accept a pending request addressed to the caller
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct AcceptContactRequest {
    /// Identity whose request to accept
    #[arg(long = "id")]
    pub requester_id: IdentityId,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Json(req): Json<AcceptContactRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.contacts().accept(caller.id(), req.requester_id).await?;
    let list = state.contacts().list_for(caller.id()).await?;
    Ok(Json(list))
}

impl ApiRequest for AcceptContactRequest {
    type Response = ContactList;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/contact/accept")?;
        Ok(client.post(full_url).json(&self))
    }
}
