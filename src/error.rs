//! Provider errors
//!
//! One error type for every operation the provider exposes. Per-item failures
//! inside batch operations are not errors; they are reported in the batch result.

use thiserror::Error;

/// Errors surfaced by the data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No query or mutation document is registered under this name
    #[error("Could not find query {0}")]
    MissingDocument(String),

    /// A singular read returned no record
    #[error("Not found: {resource} {id}")]
    NotFound { resource: String, id: String },

    /// The backend reported errors, returned no data, or could not be reached
    #[error("Data provider error: {0}")]
    Transport(String),

    /// The provider or its client was constructed with an unusable configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    /// HTTP-like status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Transport("request timed out".to_string());
        }
        if let Some(status) = err.status() {
            return Self::Transport(format!("API request failed: {}", status));
        }
        Self::Transport(format!("request failed: {}", err))
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(format!("failed to parse response JSON: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Format an error for display on the command line
/// Security: keeps backend messages out of user-facing output
pub fn format_error(error: &anyhow::Error) -> String {
    if let Some(provider_error) = error.downcast_ref::<ProviderError>() {
        return match provider_error {
            ProviderError::MissingDocument(name) => {
                format!("No document named '{}' is registered. Check your operations files.", name)
            },
            ProviderError::NotFound { resource, id } => {
                format!("{} '{}' not found.", resource, id)
            },
            ProviderError::Config(message) => format!("Invalid configuration: {}", message),
            ProviderError::Transport(message) => {
                if message.contains("401") || message.contains("403") {
                    "Authentication failed. Check your API key or token.".to_string()
                } else if message.contains("429") {
                    "Rate limit exceeded. Please try again later.".to_string()
                } else {
                    "Request failed. Check your network connection and try again.".to_string()
                }
            },
        };
    }

    // Truncate long error messages and remove potential sensitive data
    let error_str = error.to_string();
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_404() {
        let err = ProviderError::not_found("posts", "abc");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: posts abc");
    }

    #[test]
    fn test_transport_has_no_status() {
        let err = ProviderError::transport("boom");
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_format_error_hides_transport_details() {
        let err = anyhow::Error::new(ProviderError::transport("API request failed: 401 Unauthorized"));
        assert_eq!(
            format_error(&err),
            "Authentication failed. Check your API key or token."
        );
    }

    #[test]
    fn test_format_error_truncates_foreign_errors() {
        let err = anyhow::anyhow!("{}", "x".repeat(200));
        let formatted = format_error(&err);
        assert!(formatted.ends_with("..."));
        assert_eq!(formatted.len(), 83);
    }
}
