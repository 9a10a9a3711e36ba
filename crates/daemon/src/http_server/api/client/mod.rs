#[allow(clippy::module_inception)]
mod client;
mod error;
mod grid;

pub use client::{ApiClient, DEFAULT_CLIENT_TIMEOUT};
pub use error::ApiError;
pub use grid::GridCell;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
