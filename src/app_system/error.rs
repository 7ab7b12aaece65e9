use thiserror::Error;

use super::ConfigError;
use crate::user_actor::UserError;

/// Failures that stop the process.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to create admin account: {0}")]
    AdminBootstrap(#[from] UserError),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
    #[error("Actor task failed: {0}")]
    ActorTask(String),
    #[error("Timed out waiting for actors to stop")]
    ShutdownTimeout,
}
