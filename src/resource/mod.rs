//! Resource resolution layer
//!
//! Everything needed to turn a `(resource, params)` request into a concrete
//! document and variables, before any network I/O happens.
//!
//! # Architecture
//!
//! - [`registry`] - Named query and mutation documents
//! - [`schema`] - Optional model metadata for canonical names
//! - [`naming`] - Derives document names from verbs and resources
//! - [`filter`] - Selects alternate queries from the filter's shape
//! - [`pagination`] - Continuation tokens per query stream and page

pub mod filter;
pub mod naming;
pub mod pagination;
pub mod registry;
pub mod schema;

pub use filter::{select_query, Filter, SelectedQuery};
pub use naming::{by_relation_name, convention_name, resolve, Operation};
pub use pagination::{EvictionPolicy, PageCursor, PaginationCache, QuerySignature};
pub use registry::Operations;
pub use schema::{ModelMeta, SchemaMetadata};
