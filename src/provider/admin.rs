//! Admin Bridge
//!
//! User and group records live behind a separate administrative API. When admin
//! queries are enabled, lists of users or groups and single/batch user reads go
//! to an [`AdminProvider`] instead of the document pipeline.

use super::params::{GetListParams, GetManyParams, GetOneParams, ListResult, ManyResult, RecordResult};
use crate::error::Result;
use crate::resource::Operation;
use async_trait::async_trait;

/// Reserved resource for user records
pub const USERS_RESOURCE: &str = "cognitoUsers";

/// Reserved resource for group records
pub const GROUPS_RESOURCE: &str = "cognitoGroups";

/// Whether a resource belongs to the admin sub-provider
pub fn is_admin_resource(resource: &str) -> bool {
    resource == USERS_RESOURCE || resource == GROUPS_RESOURCE
}

/// Whether a read goes to the admin sub-provider.
///
/// Both reserved resources are listed there; single and batch reads only go
/// there for users. Groups are fetched through their `get` document.
pub fn routes_to_admin(operation: Operation, resource: &str) -> bool {
    match operation {
        Operation::List => is_admin_resource(resource),
        Operation::Get => resource == USERS_RESOURCE,
        _ => false,
    }
}

/// External provider for the reserved resources
#[async_trait]
pub trait AdminProvider: Send + Sync {
    async fn get_list(&self, resource: &str, params: &GetListParams) -> Result<ListResult>;

    async fn get_one(&self, resource: &str, params: &GetOneParams) -> Result<RecordResult>;

    async fn get_many(&self, resource: &str, params: &GetManyParams) -> Result<ManyResult>;
}
