//! HTTP client for the Serper.dev search API.
//!
//! Wraps `reqwest` with typed response deserialization and Serper-specific
//! error handling. Search parameters are fixed to the United Kingdom locale
//! (`gl=gb`, `hl=en`), matching the market the tracked keywords target.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::error::SerperError;
use crate::types::SerperResponse;

const DEFAULT_BASE_URL: &str = "https://google.serper.dev";

/// JSON body sent to the Serper `/search` endpoint.
#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    gl: &'a str,
    location: &'a str,
    hl: &'a str,
}

/// Client for the Serper.dev search API.
///
/// Manages the HTTP client, API key, and base URL. Use [`SerperClient::new`]
/// for production or [`SerperClient::with_base_url`] to point at a mock
/// server in tests. The client performs no retries; callers own retry policy.
pub struct SerperClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerperClient {
    /// Creates a new client pointed at the production Serper API.
    ///
    /// # Errors
    ///
    /// Returns [`SerperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, SerperError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SerperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SerperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("serptrack/0.1 (keyword-rank-tracking)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Runs one Google search for `keyword` with UK locale parameters.
    ///
    /// Issues a single POST to `/search` with the `X-API-KEY` header and
    /// returns the parsed response. An empty or absent `organic` array is a
    /// valid zero-result response.
    ///
    /// # Errors
    ///
    /// - [`SerperError::Status`] if the API answers with a non-2xx status;
    ///   carries the status code and the keyword for failure reporting.
    /// - [`SerperError::Http`] on network or transport failure.
    /// - [`SerperError::Deserialize`] if the body is not the expected shape.
    pub async fn search(&self, keyword: &str) -> Result<SerperResponse, SerperError> {
        let params = SearchParams {
            q: keyword,
            gl: "gb",
            location: "United Kingdom",
            hl: "en",
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .json(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SerperError::Status {
                status: status.as_u16(),
                keyword: keyword.to_owned(),
            });
        }

        let body = response.text().await?;
        let parsed: SerperResponse =
            serde_json::from_str(&body).map_err(|e| SerperError::Deserialize {
                context: format!("search(q={keyword})"),
                source: e,
            })?;

        tracing::debug!(
            keyword,
            organic_count = parsed.organic.len(),
            credits = ?parsed.credits,
            "serper search completed"
        );

        Ok(parsed)
    }
}
