use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort processing of a single directory.
///
/// The walker turns these into an ERROR entry for that directory; they never
/// reach the caller of a walk.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("failed to read size of {path}: {source}")]
    FileSize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blocking filesystem task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, WalkError>;
