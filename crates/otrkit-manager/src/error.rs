//! Error types for the resource manager.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up or driving the resource manager.
#[derive(Debug, Error)]
pub enum Error {
    /// Archive mounting or writing failed.
    #[error("archive error: {0}")]
    Archive(#[from] otrkit_archive::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed.
    #[error("invalid configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The loader thread could not be started.
    #[error("failed to start loader thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Result type for manager operations.
pub type Result<T> = std::result::Result<T, Error>;
