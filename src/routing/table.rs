//! Exact-match dispatch table.
//!
//! # Responsibilities
//! - Map full path strings to method bundles
//! - Merge tables with shallow overwrite (last merge wins per path)
//! - Look up the endpoint for a (path, method) pair
//!
//! # Design Decisions
//! - No pattern compilation: keys are compared byte for byte
//! - A known path with an unregistered method is a plain miss

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::request::Request;
use crate::middleware::chain::HandlerResult;
use crate::routing::method::{Method, MethodHandlers};

/// A request-consuming handler stored in the table.
pub type Endpoint = Arc<dyn Fn(Request) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Build an [`Endpoint`] from an async function of the request.
pub fn endpoint<F, Fut>(f: F) -> Endpoint
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |req: Request| -> BoxFuture<'static, HandlerResult> { Box::pin(f(req)) })
}

/// Path → method bundle mapping.
#[derive(Clone, Default, Debug)]
pub struct RouteTable {
    entries: BTreeMap<String, MethodHandlers>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one method at `path`, keeping the path's other methods.
    pub fn register(&mut self, path: impl Into<String>, method: Method, endpoint: Endpoint) {
        self.entries
            .entry(path.into())
            .or_default()
            .set(method, endpoint);
    }

    /// Replace the whole bundle at `path`.
    pub fn insert(&mut self, path: impl Into<String>, bundle: MethodHandlers) -> Option<MethodHandlers> {
        self.entries.insert(path.into(), bundle)
    }

    /// Shallow merge: every path in `other` overwrites the same path here.
    pub fn merge(&mut self, other: &RouteTable) {
        for (path, bundle) in &other.entries {
            self.entries.insert(path.clone(), bundle.clone());
        }
    }

    pub fn get(&self, path: &str) -> Option<&MethodHandlers> {
        self.entries.get(path)
    }

    /// Endpoint for an exact (path, method) match.
    pub fn lookup(&self, path: &str, method: Method) -> Option<&Endpoint> {
        self.entries.get(path).and_then(|bundle| bundle.get(method))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MethodHandlers)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
