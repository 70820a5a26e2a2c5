//! GraphQL Client
//!
//! Executes named documents against the backend and normalizes the response:
//! a payload with an error list, or without data, is a transport failure.

use super::auth::Credentials;
use super::http::{sanitize_for_log, GraphqlHttpClient};
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Executes a document with variables and returns the `data` object
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, document: &str, variables: Value) -> Result<Map<String, Value>>;
}

/// One entry of a GraphQL `errors` list
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlErrorEntry {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
}

/// Raw GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

/// Main GraphQL client
#[derive(Clone)]
pub struct GraphqlClient {
    pub credentials: Credentials,
    pub http: GraphqlHttpClient,
}

impl GraphqlClient {
    /// Create a new client for an endpoint
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self> {
        let http = GraphqlHttpClient::new(endpoint)?;
        Ok(Self { credentials, http })
    }
}

#[async_trait]
impl Transport for GraphqlClient {
    async fn execute(&self, document: &str, variables: Value) -> Result<Map<String, Value>> {
        let body = json!({
            "query": document,
            "variables": variables,
        });

        let raw = self.http.post(&body, &self.credentials).await?;
        normalize_response(raw)
    }
}

/// Turn a raw response body into its `data` object, or a transport error
pub(crate) fn normalize_response(raw: Value) -> Result<Map<String, Value>> {
    let response: GraphqlResponse = serde_json::from_value(raw)?;

    if let Some(errors) = response.errors {
        for error in &errors {
            tracing::error!(
                "GraphQL error ({}): {}",
                error.error_type.as_deref().unwrap_or("unknown"),
                sanitize_for_log(&error.message)
            );
        }
        return Err(ProviderError::transport(format!(
            "backend returned {} error(s)",
            errors.len()
        )));
    }

    response
        .data
        .ok_or_else(|| ProviderError::transport("response carried no data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_returns_data() {
        let data = normalize_response(json!({"data": {"getPost": {"id": "1"}}})).unwrap();
        assert_eq!(data["getPost"]["id"], "1");
    }

    #[test]
    fn test_normalize_rejects_errors_even_with_data() {
        let err = normalize_response(json!({
            "data": {"getPost": null},
            "errors": [{"message": "Unauthorized", "errorType": "Unauthorized"}]
        }))
        .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn test_normalize_rejects_missing_data() {
        assert!(normalize_response(json!({})).is_err());
        assert!(normalize_response(json!({"data": null})).is_err());
        assert!(normalize_response(Value::Null).is_err());
    }

    #[test]
    fn test_normalize_rejects_empty_error_list() {
        let err = normalize_response(json!({"data": {"x": 1}, "errors": []})).unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn test_normalize_accepts_null_error_list() {
        let data = normalize_response(json!({"data": {"x": 1}, "errors": null})).unwrap();
        assert_eq!(data["x"], 1);
    }
}
