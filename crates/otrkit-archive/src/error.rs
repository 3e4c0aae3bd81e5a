//! Error types for the archive crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] otrkit_common::Error),

    /// ZIP container error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The main archive could not be mounted.
    #[error("failed to mount {path}: {source}")]
    Mount {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// No archive was given to mount.
    #[error("no archives to mount")]
    NothingToMount,

    /// The container format is not supported.
    #[error("unsupported archive container: {0}")]
    UnsupportedContainer(PathBuf),

    /// A logical path that would resolve outside the archive root.
    #[error("invalid archive path: {0}")]
    InvalidPath(String),

    /// The archive does not support writing.
    #[error("archive {0} is read-only")]
    ReadOnly(String),

    /// No mounted archive accepts writes.
    #[error("no writable archive is mounted")]
    NoWritableArchive,

    /// Invalid file search mask.
    #[error("invalid file mask: {0}")]
    InvalidMask(#[from] glob::PatternError),

    /// The archive has been closed.
    #[error("archive {0} is closed")]
    Closed(String),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
