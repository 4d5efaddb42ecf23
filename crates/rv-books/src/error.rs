//! Error types for book and table emission

use std::io;
use std::path::{Path, PathBuf};

use rv_math::MathError;
use thiserror::Error;

/// Emission errors
#[derive(Error, Debug)]
pub enum BookError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("IO error at {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed table row {line} in {path}: {content:?}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        content: String,
    },

    #[error("Missing manifest for mode {0}")]
    MissingManifest(String),

    #[error("Verification failed: {0}")]
    Verification(String),
}

impl BookError {
    /// Attach a path to an IO error
    pub fn at(path: &Path) -> impl FnOnce(io::Error) -> BookError + '_ {
        move |source| BookError::File {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for emission operations
pub type Result<T> = std::result::Result<T, BookError>;
