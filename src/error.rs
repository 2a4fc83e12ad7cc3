// src/error.rs
use std::path::PathBuf;

/// Errors surfaced by the library. Resolution itself never fails; these come
/// from loading reference data, config files and index snapshots.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("index snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ResolveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResolveError::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ResolveError::Json { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
