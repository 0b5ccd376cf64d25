//! OData Client module
//!
//! HTTP client for the Topz OData API. Every call is a single authenticated
//! GET; failures are never retried.

use crate::config::Config;
use crate::odata::model::{EntitySet, QueryResult};
use crate::odata::query::QueryOptions;
use reqwest::{Client, Response};
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Per-request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error bodies are truncated to this many characters in logs
const LOG_BODY_LIMIT: usize = 500;

/// OData client errors
#[derive(Error, Debug)]
pub enum ODataError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request timeout: unable to reach {url} within {secs} seconds")]
    Timeout { url: String, secs: u64 },

    #[error("Network error: {message}. URL: {url}. Check DNS resolution and network connectivity")]
    Network { url: String, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Empty response from API (status {status})")]
    EmptyResponse { status: u16 },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Client for the Topz API
#[derive(Debug)]
pub struct ODataClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    http_client: Client,
}

impl ODataClient {
    /// Create a new client with the default 30 second timeout
    pub fn new(config: &Config) -> Result<Self, ODataError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout
    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self, ODataError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ODataError::ClientBuild)?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout,
            http_client,
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the API schema. The body is returned as-is.
    pub async fn get_schema(&self) -> Result<Value, ODataError> {
        let url = format!("{}/api/v1.0/schema", self.base_url);
        self.get_json(&url).await
    }

    /// Query orders
    pub async fn query_orders(&self, options: &QueryOptions) -> Result<QueryResult, ODataError> {
        self.query_entity(EntitySet::Order.path(), options).await
    }

    /// Query payment terms
    pub async fn query_payment_terms(
        &self,
        options: &QueryOptions,
    ) -> Result<QueryResult, ODataError> {
        self.query_entity(EntitySet::PaymentTerm.path(), options).await
    }

    /// Query any entity set by name
    ///
    /// # Arguments
    /// * `entity` - Entity set name (e.g., "order", "payment_term")
    /// * `options` - Query options
    pub async fn query_entity(
        &self,
        entity: &str,
        options: &QueryOptions,
    ) -> Result<QueryResult, ODataError> {
        let url = format!(
            "{}/api/v1.0/odata/{}{}",
            self.base_url,
            entity,
            options.to_query_string()
        );
        tracing::debug!("Query {} with options {:?}", entity, options);

        let body = self.get_json(&url).await?;

        if body.get("objects").is_none() {
            let keys: Vec<&str> = body
                .as_object()
                .map(|o| o.keys().map(String::as_str).collect())
                .unwrap_or_default();
            tracing::warn!("Unexpected response structure for {}, keys: {:?}", entity, keys);
        }

        let result: QueryResult = serde_json::from_value(body).map_err(|e| {
            ODataError::ParseError(format!("Failed to parse {} response: {}", entity, e))
        })?;

        tracing::info!(
            "Fetched {} {} records (totalSize: {:?}, done: {:?})",
            result.objects.len(),
            entity,
            result.total_size,
            result.done
        );

        Ok(result)
    }

    /// Issue one authenticated GET and parse the JSON body
    async fn get_json(&self, url: &str) -> Result<Value, ODataError> {
        tracing::debug!("Fetching: {}", url);

        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            let body = self.read_body(response, url).await.unwrap_or_default();
            tracing::warn!(
                "Error response body ({}): {}",
                status,
                body.chars().take(LOG_BODY_LIMIT).collect::<String>()
            );
            return Err(ODataError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let body = self.read_body(response, url).await?;
        tracing::debug!("Response body length: {} characters", body.len());

        if body.trim().is_empty() {
            tracing::warn!("Empty response body from {}", url);
            return Err(ODataError::EmptyResponse {
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ODataError::ParseError(format!("Invalid JSON in response: {}", e)))
    }

    async fn read_body(&self, response: Response, url: &str) -> Result<String, ODataError> {
        response
            .text()
            .await
            .map_err(|e| self.transport_error(url, e))
    }

    /// Classify a reqwest failure into timeout or network error
    fn transport_error(&self, url: &str, error: reqwest::Error) -> ODataError {
        if error.is_timeout() {
            tracing::error!("Request timeout after {} seconds: {}", self.timeout.as_secs(), url);
            ODataError::Timeout {
                url: url.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            let message = error_chain(&error);
            tracing::error!("Network error for {}: {}", url, message);
            ODataError::Network {
                url: url.to_string(),
                message,
            }
        }
    }
}

/// Pick the most useful message out of an error body: `error.message`, then
/// `message`, then the raw text
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .or_else(|| json.get("message").and_then(Value::as_str).filter(|s| !s.is_empty()))
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Render an error with all of its sources, e.g.
/// `error sending request: client error (Connect): Connection refused`
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
