//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → consumed by Server, AxumServe and logging init
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; routes change through the server API
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, ReloadStrategy, RoutingConfig, ServerConfig,
    StaticMount,
};
pub use validation::ValidationError;
