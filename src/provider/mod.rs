//! Data Provider
//!
//! CRUD-style operations over named GraphQL documents. Each operation resolves a
//! document name from the resource, builds its variables, executes it through a
//! [`Transport`] and shapes the backend payload into a generic result.
//!
//! # Module Structure
//!
//! - [`params`] - Operation parameters and results
//! - [`admin`] - Routing of reserved resources to an admin sub-provider
//!
//! # Example
//!
//! ```ignore
//! use amplify_provider::provider::{DataProvider, GetListParams, ProviderOptions};
//!
//! async fn first_page(provider: &DataProvider) -> amplify_provider::Result<()> {
//!     let page = provider.get_list("posts", GetListParams::default()).await?;
//!     println!("{} of at least {}", page.data.len(), page.total);
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod params;

pub use admin::{is_admin_resource, routes_to_admin, AdminProvider, GROUPS_RESOURCE, USERS_RESOURCE};
pub use params::*;

use crate::error::{ProviderError, Result};
use crate::graphql::Transport;
use crate::resource::{
    by_relation_name, naming, select_query, EvictionPolicy, Filter, Operation, Operations,
    PaginationCache, QuerySignature, SchemaMetadata,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Backend-managed fields removed from update payloads
pub const NON_EDITABLE_FIELDS: &[&str] = &["_deleted", "_lastChangedAt", "createdAt", "updatedAt"];

/// Optimistic-concurrency marker carried over on delete
pub const VERSION_FIELD: &str = "_version";

/// Provider construction options
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Canonical model names; the naming convention is used without it
    pub schema: Option<SchemaMetadata>,
    /// Route the reserved user/group resources to the admin provider
    pub enable_admin_queries: bool,
    /// Drop a resource's pagination streams after a successful write on it
    pub invalidate_on_write: bool,
    /// Size bound of the pagination cache the provider creates
    pub eviction: EvictionPolicy,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            schema: None,
            enable_admin_queries: false,
            invalidate_on_write: false,
            eviction: EvictionPolicy::Unbounded,
        }
    }
}

/// CRUD data provider over a named-document backend
pub struct DataProvider {
    operations: Operations,
    transport: Arc<dyn Transport>,
    schema: Option<SchemaMetadata>,
    cache: Arc<PaginationCache>,
    admin: Option<Arc<dyn AdminProvider>>,
    enable_admin_queries: bool,
    invalidate_on_write: bool,
}

impl DataProvider {
    pub fn new(operations: Operations, transport: Arc<dyn Transport>, options: ProviderOptions) -> Self {
        Self {
            operations,
            transport,
            schema: options.schema,
            cache: Arc::new(PaginationCache::new(options.eviction)),
            admin: None,
            enable_admin_queries: options.enable_admin_queries,
            invalidate_on_write: options.invalidate_on_write,
        }
    }

    /// Share a pagination cache with other providers
    pub fn with_cache(mut self, cache: Arc<PaginationCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Set the sub-provider for the reserved admin resources
    pub fn with_admin(mut self, admin: Arc<dyn AdminProvider>) -> Self {
        self.admin = Some(admin);
        self
    }

    pub fn cache(&self) -> &Arc<PaginationCache> {
        &self.cache
    }

    /// Document name for an operation on a resource
    pub fn query_name(&self, operation: Operation, resource: &str) -> String {
        naming::resolve(operation, resource, self.schema.as_ref())
    }

    /// Relation-specific list query name, e.g. `listCommentsByPostId`
    pub fn query_name_by_relation(&self, operation: Operation, resource: &str, target: &str) -> String {
        by_relation_name(operation, resource, target, self.schema.as_ref())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// One page of records
    pub async fn get_list(&self, resource: &str, params: GetListParams) -> Result<ListResult> {
        if let Some(admin) = self.admin_for(Operation::List, resource)? {
            return admin.get_list(resource, &params).await;
        }

        let default_query = self.query_name(Operation::List, resource);
        let selected = select_query(&params.filter, &self.operations, &default_query);
        let query_name = selected.query_name;
        let document = self.operations.document(&query_name)?;

        let Pagination { page, per_page } = params.pagination;
        let signature = QuerySignature::new(resource, &query_name, &selected.variables, per_page);

        let Some(cursor) = self.cache.cursor(&signature, page).await else {
            tracing::debug!("Page {} of {} is out of range", page, query_name);
            return Ok(ListResult::empty());
        };

        let mut variables = selected.variables;
        if let Some(sort) = params.sort.as_ref().filter(|sort| sort.field == query_name) {
            variables.insert("sortDirection".to_string(), Value::from(sort.order.as_str()));
        }
        variables.insert("limit".to_string(), Value::from(per_page));
        variables.insert(
            "nextToken".to_string(),
            cursor.token().map_or(Value::Null, Value::from),
        );

        let payload = self
            .send(&query_name, document, Value::Object(variables))
            .await?
            .ok_or_else(|| ProviderError::transport(format!("{} returned no data", query_name)))?;

        let items = match payload.get("items") {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(ProviderError::transport(format!(
                    "{} returned malformed items",
                    query_name
                )))
            },
        };

        let next_token = payload
            .get("nextToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty());

        self.cache.save_next_token(&signature, page, next_token).await;

        let mut total = u64::from(page - 1) * u64::from(per_page) + items.len() as u64;
        if next_token.is_some() {
            // At least one more page exists
            total += 1;
        }

        Ok(ListResult { data: items, total })
    }

    /// A single record; no record is [`ProviderError::NotFound`]
    pub async fn get_one(&self, resource: &str, params: GetOneParams) -> Result<RecordResult> {
        if let Some(admin) = self.admin_for(Operation::Get, resource)? {
            return admin.get_one(resource, &params).await;
        }

        let query_name = self.query_name(Operation::Get, resource);
        let document = self.operations.document(&query_name)?;

        match self.send(&query_name, document, json!({ "id": &params.id })).await? {
            Some(data) => Ok(RecordResult { data }),
            None => Err(ProviderError::not_found(resource, &params.id)),
        }
    }

    /// Several records, one request each, in order. Missing records are skipped.
    pub async fn get_many(&self, resource: &str, params: GetManyParams) -> Result<ManyResult> {
        if let Some(admin) = self.admin_for(Operation::Get, resource)? {
            return admin.get_many(resource, &params).await;
        }

        let query_name = self.query_name(Operation::Get, resource);
        let document = self.operations.document(&query_name)?;

        let mut result = ManyResult::default();
        for id in params.ids {
            match self.send(&query_name, document, json!({ "id": &id })).await {
                Ok(Some(record)) => result.data.push(record),
                Ok(None) => tracing::debug!("{} {} not found, skipping", resource, id),
                Err(e) => {
                    tracing::warn!("{} {} failed: {}", query_name, id, e);
                    result.failures.push(ItemFailure {
                        id,
                        reason: e.to_string(),
                    });
                },
            }
        }

        Ok(result)
    }

    /// Records related to `params.id` through `params.target`, as a list page
    pub async fn get_many_reference(
        &self,
        resource: &str,
        params: GetManyReferenceParams,
    ) -> Result<ListResult> {
        let filter = self.reference_filter(resource, &params.target, &params.id, params.filter);

        self.get_list(
            resource,
            GetListParams {
                pagination: params.pagination,
                sort: params.sort,
                filter,
            },
        )
        .await
    }

    /// Scope a filter to the owning record.
    ///
    /// `queryKey.fieldName` nests the id under that path; a plain field name nests
    /// it under the derived relation query, e.g. `{listCommentsByPostId: {postId: id}}`.
    pub fn reference_filter(&self, resource: &str, target: &str, id: &Identifier, mut filter: Filter) -> Filter {
        let (key, field) = match target.split('.').collect::<Vec<_>>().as_slice() {
            [key, field] => (key.to_string(), field.to_string()),
            _ => (
                self.query_name_by_relation(Operation::List, resource, target),
                target.to_string(),
            ),
        };

        let entry = filter.entry(key).or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(nested) = entry {
            nested.insert(field, Value::from(id));
        }

        filter
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub async fn create(&self, resource: &str, params: CreateParams) -> Result<RecordResult> {
        let query_name = self.query_name(Operation::Create, resource);
        tracing::info!("{} on {}", query_name, resource);

        let data = self.mutate(&query_name, json!({ "input": params.data })).await?;
        self.after_write(resource).await;

        Ok(RecordResult { data })
    }

    pub async fn update(&self, resource: &str, params: UpdateParams) -> Result<RecordResult> {
        let query_name = self.query_name(Operation::Update, resource);
        tracing::info!("{} on {} {}", query_name, resource, params.id);

        let input = strip_non_editable(params.data);
        let data = self.mutate(&query_name, json!({ "input": input })).await?;
        self.after_write(resource).await;

        Ok(RecordResult { data })
    }

    /// Apply the same changes to several records, one request each, in order.
    ///
    /// Failed items are reported in [`BatchResult::failures`]; the batch itself
    /// only fails when the mutation document is missing. Backends that require a
    /// `_version` per record will reject these updates, since no version is sent.
    pub async fn update_many(&self, resource: &str, params: UpdateManyParams) -> Result<BatchResult> {
        let query_name = self.query_name(Operation::Update, resource);
        let document = self.operations.document(&query_name)?;
        tracing::info!("{} on {} ({} records)", query_name, resource, params.ids.len());

        let data = strip_non_editable(params.data);
        let mut result = BatchResult::default();

        for id in params.ids {
            let mut input = data.clone();
            input.insert("id".to_string(), Value::from(&id));

            let outcome = self
                .send(&query_name, document, json!({ "input": input }))
                .await
                .and_then(|payload| require_payload(&query_name, payload));
            record_outcome(&mut result, &query_name, id, outcome);
        }

        if !result.data.is_empty() {
            self.after_write(resource).await;
        }
        Ok(result)
    }

    pub async fn delete(&self, resource: &str, params: DeleteParams) -> Result<RecordResult> {
        let query_name = self.query_name(Operation::Delete, resource);
        tracing::info!("{} on {} {}", query_name, resource, params.id);

        let mut input = Map::new();
        input.insert("id".to_string(), Value::from(&params.id));
        if let Some(version) = params.previous_data.get(VERSION_FIELD).filter(|v| is_truthy(v)) {
            input.insert(VERSION_FIELD.to_string(), version.clone());
        }

        let data = self.mutate(&query_name, json!({ "input": input })).await?;
        self.after_write(resource).await;

        Ok(RecordResult { data })
    }

    /// Delete several records, one request each, in order
    pub async fn delete_many(&self, resource: &str, params: DeleteManyParams) -> Result<BatchResult> {
        let query_name = self.query_name(Operation::Delete, resource);
        let document = self.operations.document(&query_name)?;
        tracing::info!("{} on {} ({} records)", query_name, resource, params.ids.len());

        let mut result = BatchResult::default();
        for id in params.ids {
            let outcome = self
                .send(&query_name, document, json!({ "input": { "id": &id } }))
                .await
                .and_then(|payload| require_payload(&query_name, payload));
            record_outcome(&mut result, &query_name, id, outcome);
        }

        if !result.data.is_empty() {
            self.after_write(resource).await;
        }
        Ok(result)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn admin_for(&self, operation: Operation, resource: &str) -> Result<Option<&Arc<dyn AdminProvider>>> {
        if !self.enable_admin_queries || !routes_to_admin(operation, resource) {
            return Ok(None);
        }

        match &self.admin {
            Some(admin) => Ok(Some(admin)),
            None => Err(ProviderError::config(format!(
                "admin queries are enabled but no admin provider handles {}",
                resource
            ))),
        }
    }

    /// Execute a document and pull its payload out of the response.
    /// A `null` payload is `None`.
    async fn send(&self, query_name: &str, document: &str, variables: Value) -> Result<Option<Value>> {
        tracing::debug!("Executing {}", query_name);

        let mut data = self.transport.execute(document, variables).await?;
        Ok(data.remove(query_name).filter(|payload| !payload.is_null()))
    }

    /// Execute a mutation that must return a payload
    async fn mutate(&self, query_name: &str, variables: Value) -> Result<Value> {
        let document = self.operations.document(query_name)?;
        let payload = self.send(query_name, document, variables).await?;
        require_payload(query_name, payload)
    }

    async fn after_write(&self, resource: &str) {
        if self.invalidate_on_write {
            self.cache.invalidate_resource(resource).await;
        }
    }
}

fn require_payload(query_name: &str, payload: Option<Value>) -> Result<Value> {
    payload.ok_or_else(|| ProviderError::transport(format!("{} returned no data", query_name)))
}

fn record_outcome(result: &mut BatchResult, query_name: &str, id: Identifier, outcome: Result<Value>) {
    match outcome {
        Ok(_) => result.data.push(id),
        Err(e) => {
            tracing::warn!("{} {} failed: {}", query_name, id, e);
            result.failures.push(ItemFailure {
                id,
                reason: e.to_string(),
            });
        },
    }
}

/// Remove backend-managed fields from an update payload
pub fn strip_non_editable(mut data: Record) -> Record {
    for field in NON_EDITABLE_FIELDS {
        data.remove(*field);
    }
    data
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
