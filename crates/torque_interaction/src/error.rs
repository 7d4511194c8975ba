//! Interaction error types
//!
//! Physics faults never surface here; they self-correct to rest. These cover
//! host integration only.

use thiserror::Error;

use crate::runtime::SurfaceId;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document could not be parsed into an interaction config
    #[error("Invalid interaction config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Physics runtime errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// The physics task has shut down and no longer accepts commands
    #[error("Physics task is no longer running")]
    Disconnected,

    /// A command named a surface that is not mounted
    #[error("Unknown surface: {0}")]
    UnknownSurface(SurfaceId),
}

/// Result type for physics runtime operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
