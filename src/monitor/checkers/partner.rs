//! Shared HTTP plumbing for the partner APIs (ocean portal, cloud inventory, dataset health, WMS).

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum PartnerError {
    #[error("Request timed out")]
    Timeout,
    #[error("Request failed: {0}")]
    Transport(reqwest::Error),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for PartnerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PartnerError::Timeout
        } else {
            PartnerError::Transport(e)
        }
    }
}

/// A response body together with its status and declared content type.
#[derive(Debug, Clone)]
pub struct PartnerResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Two pooled clients: a strict one and one that accepts self-signed certificates.
#[derive(Debug, Clone)]
pub struct PartnerClient {
    strict: Client,
    lenient: Client,
}

impl PartnerClient {
    pub fn new() -> Result<Self, PartnerError> {
        let strict = Client::builder().build()?;
        let lenient = Client::builder().danger_accept_invalid_certs(true).build()?;
        Ok(Self { strict, lenient })
    }

    fn client(&self, accept_invalid_certs: bool) -> &Client {
        if accept_invalid_certs {
            &self.lenient
        } else {
            &self.strict
        }
    }

    async fn send(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<PartnerResponse, PartnerError> {
        let mut request = self.client(accept_invalid_certs).get(url).timeout(timeout);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        Ok(PartnerResponse {
            status,
            content_type,
            body,
        })
    }

    /// GET `url`, requiring a 200 response.
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<PartnerResponse, PartnerError> {
        let response = self.send(url, query, bearer, timeout, accept_invalid_certs).await?;
        if response.status != StatusCode::OK.as_u16() {
            debug!(url, status = response.status, "Partner API returned a non-200 status.");
            return Err(PartnerError::Status(response.status));
        }
        Ok(response)
    }

    /// GET `url` and hand back the body whatever the HTTP status.
    /// Only transport failures and timeouts are errors.
    pub async fn get_any_status(
        &self,
        url: &str,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<PartnerResponse, PartnerError> {
        self.send(url, &[], None, timeout, accept_invalid_certs).await
    }

    pub async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, PartnerError> {
        let response = self.get(url, &[], None, timeout, false).await?;
        Ok(serde_json::from_str(&response.body)?)
    }
}

/// Unwraps a collection that is either a bare array or an object holding the array
/// under `results`, `data` or `items`.
pub fn extract_items(value: Value) -> Result<Vec<Value>, PartnerError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in ["results", "data", "items"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(items);
                }
            }
            Err(PartnerError::Shape("object without a results/data/items array".to_string()))
        }
        other => Err(PartnerError::Shape(format!("expected a collection, got {other}"))),
    }
}
