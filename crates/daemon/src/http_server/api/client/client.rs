use std::time::Duration;

use reqwest::{header::HeaderMap, header::HeaderValue, Client};
use url::Url;

use common::types::IdentityId;

use super::error::ApiError;
use super::ApiRequest;
use crate::error::ErrorBody;
use crate::http_server::auth::IDENTITY_HEADER;

/// Default timeout for a single API call
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
    identity: Option<IdentityId>,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        Self::with_timeout(remote, DEFAULT_CLIENT_TIMEOUT)
    }

    pub fn with_timeout(remote: &Url, timeout: Duration) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
            identity: None,
        })
    }

    /// Act as `identity` on every subsequent call
    pub fn with_identity(mut self, identity: IdentityId) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn identity(&self) -> Option<IdentityId> {
        self.identity
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let mut request_builder = request.build_request(&self.remote, &self.client)?;
        if let Some(identity) = self.identity {
            request_builder = request_builder.header(IDENTITY_HEADER, identity.to_string());
        }
        let response = request_builder.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T::Response>().await?);
        }

        let text = response.text().await?;
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(ApiError::Service {
                kind: body.kind,
                message: body.message,
            }),
            Err(_) => Err(ApiError::HttpStatus(status, text)),
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}
