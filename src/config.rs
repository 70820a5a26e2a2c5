//! Configuration Management
//!
//! Loads the provider configuration file and turns it into a ready
//! [`DataProvider`]. The file is YAML (JSON is accepted too).

use crate::error::Result as ProviderResult;
use crate::graphql::{AuthMode, Credentials, GraphqlClient};
use crate::provider::{DataProvider, ProviderOptions};
use crate::resource::{EvictionPolicy, Operations, SchemaMetadata};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pagination cache settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationConfig {
    /// Maximum number of query streams kept; unbounded when absent
    #[serde(default)]
    pub max_streams: Option<usize>,
    /// Drop a resource's streams after writes on it
    #[serde(default)]
    pub invalidate_on_write: bool,
}

/// Provider configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GraphQL endpoint URL
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub auth_mode: AuthMode,
    /// API key (falls back to APPSYNC_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Bearer token (falls back to APPSYNC_AUTH_TOKEN)
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub enable_admin_queries: bool,
    /// Document files, merged in order
    #[serde(default)]
    pub operations: Vec<PathBuf>,
    /// Inline documents, merged after the files
    #[serde(default)]
    pub queries: HashMap<String, String>,
    #[serde(default)]
    pub mutations: HashMap<String, String>,
    /// Amplify model introspection file
    #[serde(default)]
    pub schema: Option<PathBuf>,
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Directory relative paths resolve against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("amplify-provider").join("config.yaml"))
    }

    /// Load configuration from a file (or the default path)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path().context("Could not determine config directory")?,
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid configuration")
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Merge document files and inline documents into one registry
    pub fn load_operations(&self) -> Result<Operations> {
        let mut operations = Operations::default();

        for file in &self.operations {
            let path = self.resolve_path(file);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read operations file {}", path.display()))?;
            let partial = Operations::from_yaml(&content)
                .with_context(|| format!("Failed to parse operations file {}", path.display()))?;
            operations.extend(partial);
        }

        operations.extend(Operations::new(self.queries.clone(), self.mutations.clone()));

        if operations.queries.is_empty() && operations.mutations.is_empty() {
            tracing::warn!("No query or mutation documents configured");
        }
        Ok(operations)
    }

    pub fn load_schema(&self) -> Result<Option<SchemaMetadata>> {
        let Some(file) = &self.schema else {
            return Ok(None);
        };

        let path = self.resolve_path(file);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        let schema = SchemaMetadata::from_json(&content)
            .with_context(|| format!("Failed to parse schema file {}", path.display()))?;

        Ok(Some(schema))
    }

    pub fn credentials(&self) -> ProviderResult<Credentials> {
        Credentials::resolve(self.auth_mode, self.api_key.as_deref(), self.auth_token.as_deref())
    }

    pub fn provider_options(&self) -> Result<ProviderOptions> {
        let eviction = match self.pagination.max_streams {
            Some(max) => EvictionPolicy::MaxStreams(max),
            None => EvictionPolicy::Unbounded,
        };

        Ok(ProviderOptions {
            schema: self.load_schema()?,
            enable_admin_queries: self.enable_admin_queries,
            invalidate_on_write: self.pagination.invalidate_on_write,
            eviction,
        })
    }

    /// Build a provider talking to the configured endpoint
    pub fn build_provider(&self) -> Result<DataProvider> {
        let endpoint = self
            .endpoint
            .as_deref()
            .context("No endpoint configured")?;

        let client = GraphqlClient::new(endpoint, self.credentials()?)?;
        let provider = DataProvider::new(self.load_operations()?, Arc::new(client), self.provider_options()?);

        if self.enable_admin_queries {
            tracing::warn!("Admin queries are enabled but no admin provider is attached");
        }
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("amplify-provider-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("endpoint: https://example.com/graphql\n").unwrap();
        assert_eq!(config.auth_mode, AuthMode::AmazonCognitoUserPools);
        assert!(!config.enable_admin_queries);
        assert!(!config.pagination.invalidate_on_write);
        assert!(config.pagination.max_streams.is_none());
        assert!(config.load_schema().unwrap().is_none());
    }

    #[test]
    fn test_parses_full_config() {
        let config = Config::from_yaml(
            r#"
endpoint: https://example.com/graphql
auth_mode: API_KEY
api_key: da2-test
enable_admin_queries: true
queries:
  listPosts: "query ListPosts { listPosts { items { id } } }"
pagination:
  max_streams: 50
  invalidate_on_write: true
"#,
        )
        .unwrap();

        assert_eq!(config.auth_mode, AuthMode::ApiKey);
        assert_eq!(config.credentials().unwrap().mode(), AuthMode::ApiKey);

        let options = config.provider_options().unwrap();
        assert_eq!(options.eviction, EvictionPolicy::MaxStreams(50));
        assert!(options.invalidate_on_write);
        assert!(options.enable_admin_queries);

        let operations = config.load_operations().unwrap();
        assert!(operations.has_query("listPosts"));
    }

    #[test]
    fn test_files_resolve_relative_to_config() {
        let dir = scratch_dir("files");
        std::fs::write(
            dir.join("ops.yaml"),
            "queries:\n  getPost: \"query A\"\nmutations:\n  createPost: \"mutation B\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("schema.json"),
            r#"{"models": {"Post": {"name": "Post", "pluralName": "Posts"}}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("config.yaml"),
            "endpoint: https://example.com/graphql\noperations: [ops.yaml]\nschema: schema.json\nqueries:\n  getPost: \"query Inline\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&dir.join("config.yaml"))).unwrap();
        let operations = config.load_operations().unwrap();
        // Inline documents win over files
        assert_eq!(operations.document("getPost").unwrap(), "query Inline");
        assert_eq!(operations.document("createPost").unwrap(), "mutation B");

        let schema = config.load_schema().unwrap().unwrap();
        assert_eq!(schema.model("Post").unwrap().plural_name, "Posts");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_endpoint_is_reported() {
        let config = Config::from_yaml("auth_mode: API_KEY\napi_key: k\n").unwrap();
        let err = config.build_provider().err().unwrap();
        assert!(err.to_string().contains("No endpoint"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = Config::load(Some(Path::new("/nonexistent/amplify-provider.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
