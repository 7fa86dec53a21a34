//! Ephemeral per-run checkouts of the managed repository.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use pubgate_tools::{GitClient, ToolError};

use crate::error::{ensure_live, SyncError};

/// A private working copy owned by one run.
///
/// The backing directory (if any) is removed when the handle is dropped, so
/// every exit path cleans up, including errors and cancellation.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    guard: Option<TempDir>,
}

impl Workspace {
    /// A workspace at `root` that lives inside `guard`.
    pub fn from_temp_dir(guard: TempDir, root: PathBuf) -> Self {
        Self {
            root,
            guard: Some(guard),
        }
    }

    /// A workspace over a directory the caller owns; nothing is removed.
    pub fn unmanaged(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            guard: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the backing directory now, logging instead of failing.
    pub fn close(mut self) {
        if let Some(guard) = self.guard.take() {
            let dir = guard.path().to_path_buf();
            if let Err(err) = guard.close() {
                tracing::warn!(dir = %dir.display(), error = %err, "failed to remove workspace");
            } else {
                tracing::debug!(dir = %dir.display(), "removed workspace");
            }
        }
    }
}

/// Hands out a fresh [`Workspace`] for a repository URL.
#[async_trait]
pub trait WorkspaceProvider: Send + Sync {
    async fn acquire(&self, url: &str, cancel: &CancellationToken)
        -> Result<Workspace, SyncError>;
}

/// Clones into a new uniquely named temp directory on every call.
pub struct GitWorkspaceProvider<G: ?Sized> {
    git: Arc<G>,
}

impl<G: GitClient + ?Sized> GitWorkspaceProvider<G> {
    pub fn new(git: Arc<G>) -> Self {
        Self { git }
    }
}

#[async_trait]
impl<G: GitClient + ?Sized> WorkspaceProvider for GitWorkspaceProvider<G> {
    async fn acquire(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Workspace, SyncError> {
        ensure_live(cancel)?;

        let guard = tempfile::Builder::new()
            .prefix("pubgate-")
            .tempdir()
            .map_err(|source| SyncError::Workspace {
                url: url.to_string(),
                source: ToolError::Io {
                    path: std::env::temp_dir(),
                    source,
                },
            })?;
        let root = guard.path().join("repo");

        match self.git.clone_repo(url, &root, cancel).await {
            Ok(()) => {}
            Err(ToolError::Cancelled) => return Err(SyncError::Cancelled),
            Err(source) => {
                return Err(SyncError::Workspace {
                    url: url.to_string(),
                    source,
                })
            }
        }

        tracing::info!(url, workspace = %root.display(), "workspace ready");
        Ok(Workspace::from_temp_dir(guard, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubgate_core::CommitSettings;

    /// Creates the destination and writes a marker instead of cloning.
    struct FakeClone {
        fail: bool,
    }

    #[async_trait]
    impl GitClient for FakeClone {
        async fn clone_repo(
            &self,
            _url: &str,
            dest: &Path,
            _cancel: &CancellationToken,
        ) -> Result<(), ToolError> {
            if self.fail {
                return Err(ToolError::Failed {
                    command: "git clone".to_string(),
                    code: Some(128),
                    stderr: "repository not found".to_string(),
                });
            }
            std::fs::create_dir_all(dest).unwrap();
            std::fs::write(dest.join("README.md"), "fixture").unwrap();
            Ok(())
        }

        async fn add_if_untracked(
            &self,
            _repo: &Path,
            _file: &Path,
            _cancel: &CancellationToken,
        ) -> Result<bool, ToolError> {
            unreachable!()
        }

        async fn is_dirty(&self, _repo: &Path, _cancel: &CancellationToken) -> Result<bool, ToolError> {
            unreachable!()
        }

        async fn commit(
            &self,
            _repo: &Path,
            _message: &str,
            _settings: &CommitSettings,
            _cancel: &CancellationToken,
        ) -> Result<(), ToolError> {
            unreachable!()
        }

        async fn push(
            &self,
            _repo: &Path,
            _settings: &CommitSettings,
            _cancel: &CancellationToken,
        ) -> Result<(), ToolError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn each_acquire_is_a_fresh_directory_removed_on_drop() {
        let provider = GitWorkspaceProvider::new(Arc::new(FakeClone { fail: false }));
        let cancel = CancellationToken::new();

        let first = provider.acquire("https://example.test/r", &cancel).await.unwrap();
        let second = provider.acquire("https://example.test/r", &cancel).await.unwrap();
        assert_ne!(first.root(), second.root());
        assert!(first.root().join("README.md").exists());

        let dir = first.root().parent().unwrap().to_path_buf();
        drop(first);
        assert!(!dir.exists());

        let dir = second.root().parent().unwrap().to_path_buf();
        second.close();
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn shared_trait_object_clones_into_workspace() {
        let git: Arc<dyn GitClient> = Arc::new(FakeClone { fail: false });
        let provider: Arc<dyn WorkspaceProvider> = Arc::new(GitWorkspaceProvider::new(git));

        let ws = provider
            .acquire("https://example.test/r", &CancellationToken::new())
            .await
            .unwrap();
        assert!(ws.root().ends_with("repo"));
        assert!(ws.root().join("README.md").exists());
    }

    #[tokio::test]
    async fn clone_failure_is_a_workspace_error() {
        let provider = GitWorkspaceProvider::new(Arc::new(FakeClone { fail: true }));
        let err = provider
            .acquire("https://example.test/missing", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Workspace { .. }), "got: {err}");
        assert!(err.to_string().contains("https://example.test/missing"));
    }

    #[tokio::test]
    async fn unmanaged_workspace_is_left_in_place() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::unmanaged(tmp.path());
        ws.close();
        assert!(tmp.path().exists());
    }
}
