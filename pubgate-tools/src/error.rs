//! Error types for pubgate-tools.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from driving collaborators.
#[derive(Debug, Error)]
pub enum ToolError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The program could not be started at all.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully. `command` is redacted.
    #[error("`{command}` failed (exit code {code:?}): {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("operation cancelled")]
    Cancelled,
}

/// Convenience constructor for [`ToolError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ToolError {
    ToolError::Io {
        path: path.into(),
        source,
    }
}
