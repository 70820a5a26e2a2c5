//! Query Name Resolver
//!
//! Derives a document name from an operation verb and a resource identifier.
//! Schema metadata is consulted first; when it is absent or does not describe the
//! resource, a fixed string convention is used instead:
//!
//! - plural operations: `verb` + resource with its first letter capitalized
//! - singular operations: same, with the trailing plural character dropped
//!
//! `("list", "posts")` gives `listPosts`, `("get", "posts")` gives `getPost`.

use super::schema::SchemaMetadata;
use std::fmt;

/// Operation verbs that map to documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Plural operations name the collection, singular ones a single record
    pub fn is_plural(&self) -> bool {
        matches!(self, Self::List)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capitalize the first character and drop `drop_tail` characters from the end.
/// The first character is always kept.
fn capitalize_trimmed(value: &str, drop_tail: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let Some(first) = chars.first() else {
        return String::new();
    };

    let end = chars.len().saturating_sub(drop_tail).max(1);
    first.to_uppercase().chain(chars[1..end].iter().copied()).collect()
}

/// Name derived purely from the string convention
pub fn convention_name(operation: Operation, resource: &str) -> String {
    let drop_tail = if operation.is_plural() { 0 } else { 1 };
    format!("{}{}", operation, capitalize_trimmed(resource, drop_tail))
}

/// Name derived from schema metadata, if the schema describes the resource
pub fn schema_name(operation: Operation, resource: &str, schema: &SchemaMetadata) -> Option<String> {
    let model = schema.model(resource)?;
    let name = if operation.is_plural() {
        &model.plural_name
    } else {
        &model.name
    };
    Some(format!("{}{}", operation, name))
}

/// Resolve the document name for an operation on a resource
pub fn resolve(operation: Operation, resource: &str, schema: Option<&SchemaMetadata>) -> String {
    if let Some(schema) = schema {
        if let Some(name) = schema_name(operation, resource, schema) {
            return name;
        }
        tracing::debug!("No schema model for resource {}, using naming convention", resource);
    }

    convention_name(operation, resource)
}

/// Name of the relation-specific variant of a query:
/// `resolve(..)` + `By` + target capitalized, minus its last two characters, + `Id`.
///
/// `("list", "comments", "postId")` gives `listCommentsByPostId`.
pub fn by_relation_name(
    operation: Operation,
    resource: &str,
    target: &str,
    schema: Option<&SchemaMetadata>,
) -> String {
    format!(
        "{}By{}Id",
        resolve(operation, resource, schema),
        capitalize_trimmed(target, 2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_plural_keeps_resource() {
        assert_eq!(convention_name(Operation::List, "posts"), "listPosts");
        assert_eq!(convention_name(Operation::List, "Posts"), "listPosts");
    }

    #[test]
    fn test_convention_singular_drops_last_char() {
        assert_eq!(convention_name(Operation::Get, "posts"), "getPost");
        assert_eq!(convention_name(Operation::Create, "posts"), "createPost");
        assert_eq!(convention_name(Operation::Update, "categories"), "updateCategorie");
        assert_eq!(convention_name(Operation::Delete, "posts"), "deletePost");
    }

    #[test]
    fn test_convention_short_resources() {
        assert_eq!(convention_name(Operation::Get, "a"), "getA");
        assert_eq!(convention_name(Operation::Get, ""), "get");
        assert_eq!(convention_name(Operation::List, ""), "list");
    }

    #[test]
    fn test_schema_names_win() {
        let schema = SchemaMetadata::default().with_model("Person", "Person", "People");
        assert_eq!(resolve(Operation::List, "Person", Some(&schema)), "listPeople");
        assert_eq!(resolve(Operation::Get, "Person", Some(&schema)), "getPerson");
    }

    #[test]
    fn test_schema_miss_falls_back_to_convention() {
        let schema = SchemaMetadata::default().with_model("Person", "Person", "People");
        assert_eq!(resolve(Operation::List, "posts", Some(&schema)), "listPosts");
        assert_eq!(resolve(Operation::Delete, "posts", Some(&schema)), "deletePost");
        assert_eq!(resolve(Operation::Get, "posts", None), "getPost");
    }

    #[test]
    fn test_by_relation_name() {
        assert_eq!(
            by_relation_name(Operation::List, "comments", "postId", None),
            "listCommentsByPostId"
        );
        // Two trailing characters are always dropped, whatever they are
        assert_eq!(
            by_relation_name(Operation::List, "comments", "authorID", None),
            "listCommentsByAuthorId"
        );
        assert_eq!(by_relation_name(Operation::List, "comments", "ab", None), "listCommentsByAId");
    }
}
