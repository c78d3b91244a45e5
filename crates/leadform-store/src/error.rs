use std::path::PathBuf;

use leadform_spec::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("form '{0}' not found")]
    NotFound(String),
    #[error("storage at {0} is locked by another writer")]
    Busy(PathBuf),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid API base URL: {0}")]
    Url(String),
    #[error("stored form could not be loaded: {0}")]
    Session(#[from] SessionError),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.into(),
            source,
        }
    }
}
