use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::types::ContactList;

use crate::error::ServiceError;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ListContactsRequest {}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.contacts().list_for(caller.id()).await?))
}

impl ApiRequest for ListContactsRequest {
    type Response = ContactList;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/contact")?;
        Ok(client.get(full_url))
    }
}
