// Upstream client for the TMDB REST API

use axum::http::StatusCode;
use bytes::Bytes;
use reqwest::Client;
use serde::de::IgnoredAny;

use crate::error::{AppResult, ProxyError};
use crate::proxy::config::ProxyConfig;

/// Upstream answer that has been received in full and checked to be JSON.
///
/// The body keeps the upstream bytes untouched so it can be relayed verbatim.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig) -> AppResult<Self> {
        let http_client = crate::utils::http::create_client_with_proxy(
            config.request_timeout_secs,
            Some(&config.upstream_proxy),
        )?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full upstream URL: base, sub-path, query string
    pub fn build_url(&self, endpoint: &str, query_string: &str) -> String {
        if query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query_string)
        }
    }

    /// GET `endpoint` with the given query and collect the JSON body.
    ///
    /// Transport failures and non-JSON bodies are errors; any HTTP status,
    /// success or not, is returned as a reply.
    pub async fn fetch(&self, endpoint: &str, query_string: &str) -> Result<UpstreamReply, ProxyError> {
        let url = self.build_url(endpoint, query_string);

        // The URL carries the API key, keep it out of error messages
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body = response.bytes().await.map_err(reqwest::Error::without_url)?;

        serde_json::from_slice::<IgnoredAny>(&body)?;

        Ok(UpstreamReply { status, body })
    }
}
