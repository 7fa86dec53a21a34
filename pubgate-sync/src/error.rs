//! Error types for pubgate-sync.

use std::path::PathBuf;

use thiserror::Error;

use pubgate_core::ConfigError;
use pubgate_tools::ToolError;

/// All errors that can arise from a publish run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required setting was missing or unreadable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A collaborator (process, git, toolchain, file helper) failed.
    #[error(transparent)]
    Tool(ToolError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The repository could not be checked out.
    #[error("could not provision workspace for {url}: {source}")]
    Workspace {
        url: String,
        #[source]
        source: ToolError,
    },

    #[error("run cancelled")]
    Cancelled,
}

impl From<ToolError> for SyncError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Cancelled => SyncError::Cancelled,
            other => SyncError::Tool(other),
        }
    }
}

impl SyncError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            SyncError::Cancelled
                | SyncError::Workspace {
                    source: ToolError::Cancelled,
                    ..
                }
        )
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Return early with [`SyncError::Cancelled`] once `cancel` has fired.
pub(crate) fn ensure_live(
    cancel: &tokio_util::sync::CancellationToken,
) -> Result<(), SyncError> {
    if cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }
    Ok(())
}
