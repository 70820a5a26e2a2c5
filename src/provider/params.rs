//! Parameter and result types of the provider operations

use crate::resource::Filter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A record as sent to or returned by the backend
pub type Record = Map<String, Value>;

/// Record identifier (string or integer)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Int(i64),
    Str(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&Identifier> for Value {
    fn from(id: &Identifier) -> Self {
        match id {
            Identifier::Int(id) => Value::from(*id),
            Identifier::Str(id) => Value::String(id.clone()),
        }
    }
}

/// Sort direction, in the backend's spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, per_page: 10 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetListParams {
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub filter: Filter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOneParams {
    pub id: Identifier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetManyParams {
    pub ids: Vec<Identifier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetManyReferenceParams {
    /// Relation field, either `fieldName` or `queryName.fieldName`
    pub target: String,
    /// Identifier of the owning record
    pub id: Identifier,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub filter: Filter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateParams {
    pub data: Record,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    pub id: Identifier,
    pub data: Record,
    #[serde(default)]
    pub previous_data: Record,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateManyParams {
    pub ids: Vec<Identifier>,
    pub data: Record,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    pub id: Identifier,
    #[serde(default)]
    pub previous_data: Record,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteManyParams {
    pub ids: Vec<Identifier>,
}

/// One page of records
///
/// `total` counts the records up to this page, plus one when the backend says
/// another page exists. It is not a full count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    pub data: Vec<Value>,
    pub total: u64,
}

impl ListResult {
    /// Out-of-range page; callers redirect to page 1
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub data: Value,
}

/// A batch item that did not succeed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub id: Identifier,
    pub reason: String,
}

/// Records found by a multi-get, in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManyResult {
    pub data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ItemFailure>,
}

/// Identifiers a batch mutation succeeded for, in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub data: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ItemFailure>,
}

impl BatchResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_is_untagged() {
        let ids: Vec<Identifier> = serde_json::from_value(json!(["a", 7])).unwrap();
        assert_eq!(ids, vec![Identifier::from("a"), Identifier::Int(7)]);
        assert_eq!(Value::from(&ids[1]), json!(7));
        assert_eq!(ids[0].to_string(), "a");
    }

    #[test]
    fn test_list_params_use_react_admin_shape() {
        let params: GetListParams = serde_json::from_value(json!({
            "pagination": {"page": 2, "perPage": 25},
            "sort": {"field": "listPostsByDate", "order": "DESC"},
            "filter": {"status": "OPEN"}
        }))
        .unwrap();
        assert_eq!(params.pagination, Pagination::new(2, 25));
        assert_eq!(params.sort, Some(Sort::new("listPostsByDate", SortOrder::Desc)));
        assert_eq!(params.filter["status"], "OPEN");
    }

    #[test]
    fn test_batch_result_hides_empty_failures() {
        let result = BatchResult {
            data: vec![Identifier::from("1")],
            failures: vec![],
        };
        assert!(result.is_complete());
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"data": ["1"]}));
    }
}
