//! Error types for ncview.
//!
//! [LoadError] is the failure half of a worker result and always travels back to the
//! coordinating thread as data. [NcviewError] covers everything else: registry lookups,
//! the session store, configuration and startup.

use std::io;
use std::path::{Path, PathBuf};

/// Failure reason carried by a [crate::core::loader::LoadResult].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("I/O error on {}: {cause}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
}

impl LoadError {
    /// Classifies an io::Error by its kind.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, cause: err },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::PermissionDenied { path } | Self::Io { path, .. } => {
                path
            }
        }
    }
}

/// Crate wide error type for everything that does not cross a worker boundary.
#[derive(Debug, thiserror::Error)]
pub enum NcviewError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No preview handler available for {}", path.display())]
    NoHandlerAvailable { path: PathBuf },

    #[error("Cannot open '{}': {reason}", path.display())]
    StartupPath { path: PathBuf, reason: String },

    #[error("Session data error: {0}")]
    Session(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NcviewError>;

impl NcviewError {
    pub fn startup_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StartupPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
