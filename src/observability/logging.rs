//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Pick the log level from `RUST_LOG`, falling back to config
//! - Choose pretty or JSON output
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Initializing twice is reported, not a panic

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{LogFormat, ObservabilityConfig};

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("switchyard={level},tower_http={level}")
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber described by `config`.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let output = match config.log_format {
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(env_filter(&config.log_level))
        .try_init()
}
