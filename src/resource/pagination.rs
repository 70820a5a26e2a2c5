//! Pagination Cache
//!
//! The backend only paginates forward: each page comes back with an opaque
//! continuation token for the next one. This cache remembers, per query stream,
//! the token needed to fetch each page so that a page-indexed list can be served.
//!
//! - Page 1 needs no token and is always servable.
//! - Page `p > 1` is servable only once page `p - 1` of the same stream has been
//!   fetched and returned a token. Anything else is out of range.
//! - Concurrent fetches of the same stream and page are last-writer-wins.

use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// Identity of a paged query stream
///
/// Variables are rendered with sorted keys, so equal filters give equal signatures
/// whatever order their keys were inserted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySignature {
    resource: String,
    query_name: String,
    variables: String,
    per_page: u32,
}

impl QuerySignature {
    pub fn new(resource: &str, query_name: &str, variables: &Map<String, Value>, per_page: u32) -> Self {
        Self {
            resource: resource.to_string(),
            query_name: query_name.to_string(),
            variables: Value::Object(variables.clone()).to_string(),
            per_page,
        }
    }
}

/// Where a page starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// First page, no token
    Start,
    /// Continue after this token
    After(String),
}

impl PageCursor {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Start => None,
            Self::After(token) => Some(token),
        }
    }
}

/// How many streams the cache may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Never evict
    #[default]
    Unbounded,
    /// Keep at most this many streams, dropping the oldest first
    MaxStreams(usize),
}

#[derive(Debug, Default)]
struct CacheState {
    /// signature -> page -> token needed to fetch that page
    streams: HashMap<QuerySignature, HashMap<u32, String>>,
    /// Stream creation order, oldest first
    order: VecDeque<QuerySignature>,
}

impl CacheState {
    fn remove_stream(&mut self, signature: &QuerySignature) {
        self.streams.remove(signature);
        self.order.retain(|s| s != signature);
    }
}

/// Continuation tokens keyed by (signature, page)
#[derive(Debug, Default)]
pub struct PaginationCache {
    policy: EvictionPolicy,
    state: RwLock<CacheState>,
}

impl PaginationCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Cursor for a page, or `None` when the page is out of range
    pub async fn cursor(&self, signature: &QuerySignature, page: u32) -> Option<PageCursor> {
        match page {
            0 => None,
            1 => Some(PageCursor::Start),
            _ => {
                let state = self.state.read().await;
                state
                    .streams
                    .get(signature)
                    .and_then(|pages| pages.get(&page))
                    .map(|token| PageCursor::After(token.clone()))
            },
        }
    }

    /// Record the token returned with `page`, which is needed to fetch `page + 1`.
    /// No token means `page` was the last one.
    pub async fn save_next_token(&self, signature: &QuerySignature, page: u32, next_token: Option<&str>) {
        let next_page = page.saturating_add(1);
        let mut state = self.state.write().await;

        let Some(token) = next_token else {
            if let Some(pages) = state.streams.get_mut(signature) {
                pages.remove(&next_page);
            }
            return;
        };

        if !state.streams.contains_key(signature) {
            if let EvictionPolicy::MaxStreams(max) = self.policy {
                while state.streams.len() >= max.max(1) {
                    let Some(oldest) = state.order.pop_front() else {
                        break;
                    };
                    tracing::debug!("Evicting pagination stream for {}", oldest.query_name);
                    state.streams.remove(&oldest);
                }
            }
            state.order.push_back(signature.clone());
        }

        state
            .streams
            .entry(signature.clone())
            .or_default()
            .insert(next_page, token.to_string());
    }

    /// Drop every stream of a resource. Returns how many were dropped.
    pub async fn invalidate_resource(&self, resource: &str) -> usize {
        let mut state = self.state.write().await;
        let stale: Vec<QuerySignature> = state
            .streams
            .keys()
            .filter(|s| s.resource == resource)
            .cloned()
            .collect();

        for signature in &stale {
            state.remove_stream(signature);
        }

        if !stale.is_empty() {
            tracing::debug!("Invalidated {} pagination stream(s) for {}", stale.len(), resource);
        }
        stale.len()
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.streams.clear();
        state.order.clear();
    }

    /// Number of streams currently held
    pub async fn stream_count(&self) -> usize {
        self.state.read().await.streams.len()
    }
}
