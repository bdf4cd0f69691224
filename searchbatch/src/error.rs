use std::path::PathBuf;

use searchbatch_core::SearchbatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptSourceError {
    #[error("failed to read prompts from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed prompt source {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a batch stopped early. Records written before the failure stay on disk.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("prompt at index {index} failed: {source}")]
    Respond {
        index: usize,
        #[source]
        source: SearchbatchError,
    },
    #[error("filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("output record JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
