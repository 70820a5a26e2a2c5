//! Schema model metadata
//!
//! Optional canonical naming for resources, read from an Amplify-style
//! `schema.json` (`{"models": {"Post": {"name": "Post", "pluralName": "Posts", ...}}}`).
//! Only the naming fields are kept; everything else in the file is ignored.

use serde::Deserialize;
use std::collections::HashMap;

/// Naming information for one model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMeta {
    pub name: String,
    pub plural_name: String,
}

/// Models keyed by resource identifier
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaMetadata {
    #[serde(default)]
    pub models: HashMap<String, ModelMeta>,
}

impl SchemaMetadata {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn with_model(mut self, resource: &str, name: &str, plural_name: &str) -> Self {
        self.models.insert(
            resource.to_string(),
            ModelMeta {
                name: name.to_string(),
                plural_name: plural_name.to_string(),
            },
        );
        self
    }

    /// Model for a resource, if the schema describes it
    pub fn model(&self, resource: &str) -> Option<&ModelMeta> {
        self.models.get(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_amplify_schema_and_ignores_extras() {
        let schema = SchemaMetadata::from_json(
            r#"{
                "models": {
                    "Post": {
                        "name": "Post",
                        "pluralName": "Posts",
                        "syncable": true,
                        "fields": {"id": {"name": "id", "isRequired": true}}
                    }
                },
                "enums": {},
                "version": "abc"
            }"#,
        )
        .unwrap();

        assert_eq!(
            schema.model("Post"),
            Some(&ModelMeta {
                name: "Post".to_string(),
                plural_name: "Posts".to_string()
            })
        );
        assert!(schema.model("posts").is_none());
    }
}
