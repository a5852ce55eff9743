//! Onion-style chain execution.
//!
//! Layer *i* receives a [`Next`] that runs layer *i+1* when invoked. Work
//! done before `next.run(req).await` happens on the way in, work done on
//! the returned response happens on the way out. A layer that never calls
//! `next` ends the chain with its own response.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::{Error, Result};
use crate::http::request::Request;
use crate::http::response::Response;

/// What every layer and handler resolves to.
pub type HandlerResult = Result<Response>;

/// A request-processing unit that may delegate to the rest of the chain.
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, req: &'a mut Request, next: Next) -> BoxFuture<'a, HandlerResult>;
}

/// Shared handle to a middleware, as stored in stacks and chains.
pub type Layer = Arc<dyn Middleware>;

/// Continuation to the remainder of a chain.
#[derive(Clone)]
pub struct Next {
    chain: Arc<[Layer]>,
    index: usize,
}

impl Next {
    /// Continuation positioned at the start of `chain`.
    pub fn new(chain: impl Into<Arc<[Layer]>>) -> Self {
        Self {
            chain: chain.into(),
            index: 0,
        }
    }

    /// Run the layer this continuation points at.
    ///
    /// Fails with [`Error::ChainExhausted`] when there is no layer left.
    pub fn run<'a>(self, req: &'a mut Request) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let Some(layer) = self.chain.get(self.index).cloned() else {
                return Err(Error::ChainExhausted);
            };
            let next = Next {
                chain: self.chain,
                index: self.index + 1,
            };
            layer.call(req, next).await
        })
    }

    /// Layers left to run, including the current one.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("len", &self.chain.len())
            .finish()
    }
}

/// Run `chain` against `req` from the first layer.
pub async fn run(req: &mut Request, chain: impl Into<Arc<[Layer]>>) -> HandlerResult {
    Next::new(chain).run(req).await
}

/// Middleware built from a function of `(request, next)`.
pub struct FromFn<F>(F);

impl<F> Middleware for FromFn<F>
where
    F: for<'a> Fn(&'a mut Request, Next) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, req: &'a mut Request, next: Next) -> BoxFuture<'a, HandlerResult> {
        (self.0)(req, next)
    }
}

/// Terminal layer built from a function of the request alone.
///
/// It never calls `next`, so anything registered after it is unreachable.
pub struct Handler<F>(F);

impl<F> Middleware for Handler<F>
where
    F: for<'a> Fn(&'a mut Request) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, req: &'a mut Request, _next: Next) -> BoxFuture<'a, HandlerResult> {
        (self.0)(req)
    }
}

/// Layer from a `(request, next)` function or closure.
pub fn middleware<F>(f: F) -> Layer
where
    F: for<'a> Fn(&'a mut Request, Next) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    Arc::new(FromFn(f))
}

/// Terminal layer from a `(request)` function or closure.
pub fn handler<F>(f: F) -> Layer
where
    F: for<'a> Fn(&'a mut Request) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    Arc::new(Handler(f))
}

/// Layer from any [`Middleware`] implementor.
pub fn layer<M: Middleware>(m: M) -> Layer {
    Arc::new(m)
}
