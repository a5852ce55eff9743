//! Ordered, shareable middleware sequence.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::middleware::chain::Layer;

/// An ordered list of layers shared between its owner and every endpoint
/// that reads it at dispatch time.
///
/// Clones point at the same sequence. Readers get a snapshot, so a layer
/// added mid-request only affects requests that start afterwards.
#[derive(Clone, Default)]
pub struct MiddlewareStack {
    layers: Arc<ArcSwap<Vec<Layer>>>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front: the newest layer runs before all others.
    pub fn prepend(&self, layer: Layer) {
        self.layers.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(layer.clone());
            next.extend(current.iter().cloned());
            next
        });
    }

    /// Insert at the back: the newest layer runs after all others.
    pub fn push(&self, layer: Layer) {
        self.layers.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(layer.clone());
            next
        });
    }

    /// Current layers in execution order.
    pub fn snapshot(&self) -> Arc<Vec<Layer>> {
        self.layers.load_full()
    }

    pub fn len(&self) -> usize {
        self.layers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.load().is_empty()
    }

    /// True when both handles share one sequence.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.layers, &other.layers)
    }
}

impl std::fmt::Debug for MiddlewareStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareStack")
            .field("len", &self.len())
            .finish()
    }
}
