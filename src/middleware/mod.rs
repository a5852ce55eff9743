//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Matched endpoint
//!     → compose chain: global stack ++ route stack ++ call-site layers
//!     → chain.rs (run layer 0, each layer may call next)
//!     → terminal handler returns Response
//!     → after-logic unwinds in reverse order
//! ```
//!
//! # Design Decisions
//! - A chain with no terminal handler is a registration bug and fails
//!   with `ChainExhausted` instead of producing a default response
//! - Stacks are read at dispatch time; nothing is copied into endpoints

pub mod chain;
pub mod stack;

pub use chain::{handler, layer, middleware, HandlerResult, Layer, Middleware, Next};
pub use stack::MiddlewareStack;
