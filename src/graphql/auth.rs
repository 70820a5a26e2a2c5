//! GraphQL endpoint authentication
//!
//! Every request carries one auth mode, fixed when the client is built, and the
//! secret that mode needs. Secrets come from configuration first, then from
//! environment variables.

use crate::error::{ProviderError, Result};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable read when no API key is configured
pub const API_KEY_ENV: &str = "APPSYNC_API_KEY";

/// Environment variable read when no bearer token is configured
pub const AUTH_TOKEN_ENV: &str = "APPSYNC_AUTH_TOKEN";

/// Authorization mode selector sent with every document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthMode {
    ApiKey,
    AwsIam,
    OpenidConnect,
    #[default]
    AmazonCognitoUserPools,
    AwsLambda,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "API_KEY",
            Self::AwsIam => "AWS_IAM",
            Self::OpenidConnect => "OPENID_CONNECT",
            Self::AmazonCognitoUserPools => "AMAZON_COGNITO_USER_POOLS",
            Self::AwsLambda => "AWS_LAMBDA",
        }
    }

    /// Header the secret travels in
    fn header_name(&self) -> &'static str {
        match self {
            Self::ApiKey => "x-api-key",
            _ => "authorization",
        }
    }

    fn secret_env(&self) -> &'static str {
        match self {
            Self::ApiKey => API_KEY_ENV,
            _ => AUTH_TOKEN_ENV,
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auth mode plus the secret it sends
#[derive(Clone)]
pub struct Credentials {
    mode: AuthMode,
    secret: String,
}

impl Credentials {
    /// Build credentials from an explicit secret
    pub fn new(mode: AuthMode, secret: impl Into<String>) -> Result<Self> {
        // SigV4 request signing is not implemented
        if mode == AuthMode::AwsIam {
            return Err(ProviderError::config(
                "AWS_IAM auth mode requires request signing, which is not supported",
            ));
        }

        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ProviderError::config(format!("empty secret for auth mode {}", mode)));
        }

        Ok(Self { mode, secret })
    }

    /// Build credentials from the configured secrets, falling back to the environment
    pub fn resolve(mode: AuthMode, api_key: Option<&str>, auth_token: Option<&str>) -> Result<Self> {
        let configured = match mode {
            AuthMode::ApiKey => api_key,
            _ => auth_token,
        };

        if let Some(secret) = configured {
            return Self::new(mode, secret);
        }

        match std::env::var(mode.secret_env()) {
            Ok(secret) => Self::new(mode, secret),
            Err(_) => Err(ProviderError::config(format!(
                "no secret configured for auth mode {} (set {})",
                mode,
                mode.secret_env()
            ))),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Attach the secret to an outgoing request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(self.mode.header_name(), &self.secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Security: never print the secret
        f.debug_struct("Credentials")
            .field("mode", &self.mode)
            .field("secret", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_mode_wire_names() {
        let mode: AuthMode = serde_json::from_str("\"OPENID_CONNECT\"").unwrap();
        assert_eq!(mode, AuthMode::OpenidConnect);
        assert_eq!(
            serde_json::to_string(&AuthMode::AmazonCognitoUserPools).unwrap(),
            "\"AMAZON_COGNITO_USER_POOLS\""
        );
        assert_eq!(AuthMode::default(), AuthMode::AmazonCognitoUserPools);
    }

    #[test]
    fn test_iam_is_rejected() {
        let err = Credentials::new(AuthMode::AwsIam, "secret").unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(Credentials::new(AuthMode::ApiKey, "  ").is_err());
    }

    #[test]
    fn test_configured_secret_wins() {
        let creds = Credentials::resolve(AuthMode::ApiKey, Some("da2-key"), Some("token")).unwrap();
        assert_eq!(creds.mode(), AuthMode::ApiKey);
        assert_eq!(creds.secret, "da2-key");

        let creds = Credentials::resolve(AuthMode::AwsLambda, Some("da2-key"), Some("token")).unwrap();
        assert_eq!(creds.secret, "token");
    }

    #[test]
    fn test_debug_masks_secret() {
        let creds = Credentials::new(AuthMode::ApiKey, "da2-very-secret").unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("ApiKey"));
    }
}
