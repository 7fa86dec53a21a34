//! Error types for pubgate-fetch.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while producing the payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("reading response from {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed PEM: {0}")]
    Pem(String),

    #[error("source {0} produced no entries")]
    Empty(String),

    #[error("fetch task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("fetch cancelled")]
    Cancelled,
}
