//! CRUD data provider over a schema-driven, named-query GraphQL backend.
//!
//! Callers issue `list`, `get`, `create`, `update`, `delete` (and their batch
//! variants) keyed by a resource name. The provider resolves which pre-authored
//! document to run, builds its variables, executes it and normalizes the result.
//! Forward-only token pagination is presented as a page-indexed list.

pub mod config;
pub mod error;
pub mod graphql;
pub mod provider;
pub mod resource;

pub use config::Config;
pub use error::{ProviderError, Result};
pub use graphql::{AuthMode, Credentials, GraphqlClient, Transport};
pub use provider::{DataProvider, ProviderOptions};
pub use resource::{Operation, Operations, PaginationCache, SchemaMetadata};
