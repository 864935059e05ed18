//! # grants-client
//!
//! Client for the bulk `/grants` endpoint of the identity platform.
//!
//! Every call takes a batch of requests and returns the HTTP status together
//! with one [`BulkResponse`] per request. Batches are validated locally first:
//! a batch that fails validation is never sent.

pub mod error;
pub mod models;
pub mod validation;

pub use crate::error::{BulkErrorCode, ErrorResponse, GrantsError, ItemErrors, Lang};
pub use crate::models::{
    BulkResponse, CreateGrantsRequest, CreateGrantsResponse, DeleteGrantsRequest,
    DeleteGrantsResponse, Grant, ReadGrantsRequest, ReadGrantsResponse,
};

use crate::validation::{validate_batch, Validate};
use log::debug;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

const GRANTS_ENDPOINT: &str = "grants";

/// HTTP client for the `/grants` endpoint
#[derive(Clone, Debug)]
pub struct GrantsClient {
    client: Client,
    base_url: Url,
    max_requests: Option<usize>,
}

impl GrantsClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// When `token` is given it is sent as `Authorization: Bearer <token>`
    /// with every request.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, GrantsError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(2))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            max_requests: None,
        })
    }

    /// Rejects batches with more than `max` requests before sending them
    pub fn with_max_requests(mut self, max: usize) -> Self {
        self.max_requests = Some(max);
        self
    }

    pub async fn create_grants(
        &self,
        requests: &[CreateGrantsRequest],
    ) -> Result<(StatusCode, Vec<BulkResponse<CreateGrantsResponse>>), GrantsError> {
        self.send_batch(Method::POST, requests).await
    }

    pub async fn read_grants(
        &self,
        requests: &[ReadGrantsRequest],
    ) -> Result<(StatusCode, Vec<BulkResponse<ReadGrantsResponse>>), GrantsError> {
        self.send_batch(Method::GET, requests).await
    }

    pub async fn delete_grants(
        &self,
        requests: &[DeleteGrantsRequest],
    ) -> Result<(StatusCode, Vec<BulkResponse<DeleteGrantsResponse>>), GrantsError> {
        self.send_batch(Method::DELETE, requests).await
    }

    /// Validates the batch, then sends it as the JSON body of one request
    async fn send_batch<T, R>(
        &self,
        method: Method,
        requests: &[T],
    ) -> Result<(StatusCode, Vec<BulkResponse<R>>), GrantsError>
    where
        T: Serialize + Validate,
        R: DeserializeOwned,
    {
        validate_batch(requests, self.max_requests)?;

        let url = self.base_url.join(GRANTS_ENDPOINT)?;
        debug!("Sending {} {} with {} request(s)", method, url, requests.len());

        let response = self
            .client
            .request(method, url)
            .json(requests)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if body.is_empty() {
            debug!("Grants endpoint answered {} with an empty body", status);
            return Ok((status, Vec::new()));
        }
        Ok((status, serde_json::from_slice(&body)?))
    }
}
