//! Shared HTTP plumbing for RapidAPI-hosted services

use anyhow::{anyhow, Result};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::transcript::FetchError;

/// A RapidAPI service location.
///
/// `host` goes into the `x-rapidapi-host` header and stays fixed even when
/// `base_url` is pointed somewhere else (a proxy or a local fixture).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RapidApiEndpoint {
    pub host: String,
    pub base_url: String,
}

impl RapidApiEndpoint {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            base_url: format!("https://{}", host),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Authenticated client shared by every RapidAPI caller
#[derive(Debug, Clone)]
pub struct RapidApiClient {
    client: reqwest::Client,
    api_key: String,
}

impl RapidApiClient {
    /// Build a client. An empty key is rejected so requests are never sent unauthenticated.
    pub fn new(api_key: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(anyhow!("RapidAPI key required"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client, api_key })
    }

    /// Start a GET request against `endpoint` with the RapidAPI headers attached
    pub fn get<Q>(&self, endpoint: &RapidApiEndpoint, path: &str, query: &Q) -> RequestBuilder
    where
        Q: Serialize + ?Sized,
    {
        let url = endpoint.url(path);
        debug!("GET {} (host {})", url, endpoint.host);

        self.client
            .get(url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &endpoint.host)
            .query(query)
    }

    /// Send a request and return the response when the status is a success.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::UpstreamUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::UpstreamError { status, body });
        }

        Ok(response)
    }

    /// Send a request and decode a successful JSON body into `T`
    pub async fn send_json<T>(&self, request: RequestBuilder) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::UpstreamUnreachable(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }
}
