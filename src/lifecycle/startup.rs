//! Startup orchestration.
//!
//! # Responsibilities
//! - Build a server from validated configuration
//! - Mount the configured static files before any listener exists
//!
//! # Design Decisions
//! - Fail fast: a static file that cannot be loaded aborts startup
//! - Mounting happens before `listen`, so no restart is triggered

use std::path::Path;

use crate::config::{load_config, ConfigError, ServerConfig};
use crate::error::Result;
use crate::http::server::Server;

/// Defaults when no path is given, otherwise the file at `path`.
pub fn load(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(ServerConfig::default()),
    }
}

/// Mount every configured static file on `server`.
pub async fn mount_statics(server: &mut Server) -> Result<()> {
    let mounts = server.config().statics.clone();
    for mount in &mounts {
        server.mount_static(&mount.path, &mount.file).await?;
    }
    Ok(())
}

/// A default-primitive server with its static files mounted.
pub async fn prepare(config: ServerConfig) -> Result<Server> {
    tracing::info!(
        host = %config.listener.host,
        base_path = %config.routing.base_path,
        reload = ?config.routing.reload,
        statics = config.statics.len(),
        "Preparing server"
    );
    let mut server = Server::new(config);
    mount_statics(&mut server).await?;
    Ok(server)
}
