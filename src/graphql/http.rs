//! HTTP utilities for GraphQL endpoint calls

use super::auth::Credentials;
use crate::error::{ProviderError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for a single GraphQL endpoint
#[derive(Clone)]
pub struct GraphqlHttpClient {
    client: Client,
    endpoint: Url,
}

impl GraphqlHttpClient {
    /// Create a new HTTP client for the given endpoint
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ProviderError::config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ProviderError::config(format!(
                "endpoint must be http or https, got {}",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("amplify-provider/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// POST a JSON body to the endpoint and return the parsed JSON response
    pub async fn post(&self, body: &Value, credentials: &Credentials) -> Result<Value> {
        tracing::debug!("POST {} ({})", self.endpoint, credentials.mode());

        let request = credentials.apply(self.client.post(self.endpoint.clone()).json(body));
        let response = request.send().await?;

        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(ProviderError::transport(format!("API request failed: {}", status)));
        }

        if response_body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response_body)?)
    }
}
