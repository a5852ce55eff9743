//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate prefixes and mount paths compose into clean table keys
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Detect duplicate static mounts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::IpAddr;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.host {0:?} is not an IP address")]
    InvalidHost(String),

    #[error("listener.drain_timeout_secs must be greater than zero")]
    ZeroDrainTimeout,

    #[error("routing.base_path {0:?} must be empty or start with '/' and not end with '/'")]
    InvalidBasePath(String),

    #[error("routing.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("static mount path {0:?} must start with '/'")]
    InvalidMountPath(String),

    #[error("static mount path {0:?} is declared more than once")]
    DuplicateMount(String),

    #[error("static mount {0:?} has an empty file path")]
    EmptyMountFile(String),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Check a config, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::InvalidHost(config.listener.host.clone()));
    }
    if config.listener.drain_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDrainTimeout);
    }

    let base = &config.routing.base_path;
    if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
        errors.push(ValidationError::InvalidBasePath(base.clone()));
    }
    if config.routing.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let mut seen = HashSet::new();
    for mount in &config.statics {
        if !mount.path.starts_with('/') {
            errors.push(ValidationError::InvalidMountPath(mount.path.clone()));
        }
        if !seen.insert(mount.path.as_str()) {
            errors.push(ValidationError::DuplicateMount(mount.path.clone()));
        }
        if mount.file.trim().is_empty() {
            errors.push(ValidationError::EmptyMountFile(mount.path.clone()));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
