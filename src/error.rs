//! Crate-wide error type.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors produced by chain execution, request helpers and listener lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every layer called `next` and the chain ran out.
    #[error("No final handler found")]
    ChainExhausted,

    /// The request body could not be read (includes the body size limit).
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The static file loader could not produce a handler.
    #[error("failed to load static file {}: {source}", path.display())]
    StaticLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid listener host {0:?}")]
    InvalidHost(String),

    /// The serving task exited with an error or panicked.
    #[error("listener task failed: {0}")]
    Listener(String),

    /// An error raised by user middleware or handlers.
    #[error(transparent)]
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary handler error.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Handler(err.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_exhausted_message_is_stable() {
        assert_eq!(Error::ChainExhausted.to_string(), "No final handler found");
    }

    #[test]
    fn handler_wraps_strings_and_errors() {
        let err = Error::handler("not authorized");
        assert_eq!(err.to_string(), "not authorized");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert_eq!(Error::handler(io).to_string(), "disk gone");
    }
}
