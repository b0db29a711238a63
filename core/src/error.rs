use std::path::PathBuf;
use thiserror::Error;

/// Fatal problem with an input or output document. Anything reported here aborts the run.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{kind} file not found: {}", path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

impl InputError {
    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        InputError::Invalid { path: path.into(), reason: reason.into() }
    }
}
