//! GraphQL endpoint interaction module
//!
//! The only part of the crate that performs network I/O.
//!
//! # Module Structure
//!
//! - [`auth`] - Auth mode selector and credentials
//! - [`client`] - The [`Transport`] seam and its HTTP implementation
//! - [`http`] - Raw JSON POST against the endpoint
//!
//! # Example
//!
//! ```ignore
//! use amplify_provider::graphql::{AuthMode, Credentials, GraphqlClient, Transport};
//!
//! async fn example() -> amplify_provider::Result<()> {
//!     let credentials = Credentials::new(AuthMode::ApiKey, "da2-xxxx")?;
//!     let client = GraphqlClient::new("https://example.com/graphql", credentials)?;
//!     let data = client.execute("query ListPosts { listPosts { items { id } } }", serde_json::json!({})).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;

pub use auth::{AuthMode, Credentials};
pub use client::{GraphqlClient, Transport};
