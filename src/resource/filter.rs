//! Filter Translator
//!
//! A filter whose single top-level key names a registered query selects that
//! query instead of the default list query; the nested object becomes its
//! variables. Any other filter is passed through to the default query as plain
//! variables.
//!
//! ```text
//! { "listCommentsByPostId": { "postId": "p1" } }  ->  listCommentsByPostId(postId: "p1")
//! { "status": "PUBLISHED" }                      ->  listComments(status: "PUBLISHED")
//! ```

use super::registry::Operations;
use serde_json::{Map, Value};

/// Generic filter object
pub type Filter = Map<String, Value>;

/// Query and variables a list request will run with
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedQuery {
    pub query_name: String,
    pub variables: Map<String, Value>,
    /// True when the filter picked an alternate query
    pub overridden: bool,
}

/// Alternate query selected by the filter's shape, if any
pub fn filter_override(
    filter: &Filter,
    operations: &Operations,
    default_query: &str,
) -> Option<(String, Map<String, Value>)> {
    if filter.len() != 1 {
        return None;
    }

    let (query_name, nested) = filter.iter().next()?;
    if query_name == default_query || !operations.has_query(query_name) {
        return None;
    }

    let variables = nested.as_object()?;
    Some((query_name.clone(), variables.clone()))
}

/// Pick the query for a list request: the filter's override, else the default
pub fn select_query(filter: &Filter, operations: &Operations, default_query: &str) -> SelectedQuery {
    match filter_override(filter, operations, default_query) {
        Some((query_name, variables)) => {
            tracing::debug!("Filter selected query {}", query_name);
            SelectedQuery {
                query_name,
                variables,
                overridden: true,
            }
        },
        None => SelectedQuery {
            query_name: default_query.to_string(),
            variables: filter.clone(),
            overridden: false,
        },
    }
}
