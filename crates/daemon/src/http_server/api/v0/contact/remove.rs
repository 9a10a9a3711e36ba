use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::{ContactList, IdentityId};

use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

/// Drop any edge with another identity, whatever its state
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RemoveContactRequest {
    /// Identity on the other end of the edge
    #[arg(long = "id")]
    pub other_id: IdentityId,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
    Json(req): Json<RemoveContactRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.contacts().remove(caller.id(), req.other_id).await?;
    let list = state.contacts().list_for(caller.id()).await?;
    Ok(Json(list))
}

impl ApiRequest for RemoveContactRequest {
    type Response = ContactList;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/contact/remove")?;
        Ok(client.post(full_url).json(&self))
    }
}
