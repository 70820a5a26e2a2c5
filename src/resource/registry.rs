//! Operation Registry - named query and mutation documents
//!
//! Documents are pre-authored strings keyed by name. Several document files can
//! be merged into one registry; later files win on duplicate names.

use crate::error::{ProviderError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Query and mutation documents keyed by name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operations {
    #[serde(default)]
    pub queries: HashMap<String, String>,
    #[serde(default)]
    pub mutations: HashMap<String, String>,
}

impl Operations {
    pub fn new(queries: HashMap<String, String>, mutations: HashMap<String, String>) -> Self {
        Self { queries, mutations }
    }

    /// Parse a document file (`queries:` / `mutations:` maps, YAML or JSON)
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Merge another set of documents into this one
    pub fn extend(&mut self, other: Operations) {
        self.queries.extend(other.queries);
        self.mutations.extend(other.mutations);
    }

    /// Whether a query (not a mutation) is registered under this name
    pub fn has_query(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    /// Look up a document by name, queries first, then mutations
    pub fn document(&self, name: &str) -> Result<&str> {
        if let Some(query) = self.queries.get(name) {
            return Ok(query);
        }

        if let Some(mutation) = self.mutations.get(name) {
            return Ok(mutation);
        }

        tracing::error!("Could not find query {}", name);
        Err(ProviderError::MissingDocument(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Operations {
        Operations::from_yaml(
            r#"
queries:
  listPosts: "query ListPosts { listPosts { items { id } nextToken } }"
  getPost: "query GetPost($id: ID!) { getPost(id: $id) { id } }"
mutations:
  createPost: "mutation CreatePost($input: CreatePostInput!) { createPost(input: $input) { id } }"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_prefers_queries_then_mutations() {
        let ops = sample();
        assert!(ops.document("listPosts").unwrap().starts_with("query ListPosts"));
        assert!(ops.document("createPost").unwrap().starts_with("mutation"));
    }

    #[test]
    fn test_missing_document_is_config_error() {
        let err = sample().document("deletePost").unwrap_err();
        assert!(matches!(err, ProviderError::MissingDocument(ref name) if name == "deletePost"));
    }

    #[test]
    fn test_has_query_ignores_mutations() {
        let ops = sample();
        assert!(ops.has_query("getPost"));
        assert!(!ops.has_query("createPost"));
    }

    #[test]
    fn test_extend_merges_and_overrides() {
        let mut ops = sample();
        ops.extend(Operations::from_yaml("queries:\n  getPost: \"query Other\"\n").unwrap());
        assert_eq!(ops.document("getPost").unwrap(), "query Other");
        assert!(ops.document("createPost").unwrap().starts_with("mutation CreatePost"));
        assert!(ops.document("listPosts").unwrap().starts_with("query ListPosts"));
    }
}
