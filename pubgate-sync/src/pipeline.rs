//! Shared publish entrypoint used by the `run` and `check` commands.
//!
//! One call covers workspace acquisition, change detection, publish and
//! commit-back. The commit step only follows a publish that actually pushed a
//! package; a failed build leaves the stored fingerprint alone so the next
//! run tries again.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use pubgate_core::config::DEFAULT_COMMIT_MESSAGE;
use pubgate_core::{EnvSource, Fingerprint, PublishDescriptor};
use pubgate_tools::{GitClient, Toolchain};

use crate::commit::{commit_fingerprint, CommitOutcome};
use crate::detector::{detect, ChangeDecision};
use crate::error::{ensure_live, SyncError};
use crate::fingerprint;
use crate::publish::{publish, PublishOutcome};
use crate::workspace::WorkspaceProvider;

/// What a full run ended with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The stored fingerprint matched; nothing was built or pushed.
    Skipped { fingerprint: Fingerprint },
    /// Publishing was required but the build failed.
    BuildFailed,
    /// A package was pushed and the fingerprint recorded.
    Published {
        fingerprint: Fingerprint,
        version: String,
        commit: CommitOutcome,
    },
}

/// Orchestrates one publish run over injected collaborators.
pub struct PublishRunner {
    git: Arc<dyn GitClient>,
    toolchain: Arc<dyn Toolchain>,
    workspaces: Arc<dyn WorkspaceProvider>,
    env: Arc<dyn EnvSource>,
    commit_message: String,
}

impl PublishRunner {
    pub fn new(
        git: Arc<dyn GitClient>,
        toolchain: Arc<dyn Toolchain>,
        workspaces: Arc<dyn WorkspaceProvider>,
        env: Arc<dyn EnvSource>,
    ) -> Self {
        Self {
            git,
            toolchain,
            workspaces,
            env,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    /// Publish `artifact` if it differs from the fingerprint recorded in the
    /// descriptor's repository, then record the new fingerprint.
    ///
    /// `artifact` is consumed when a publish is attempted.
    pub async fn push_if_changes_needed(
        &self,
        artifact: &Path,
        descriptor: &PublishDescriptor,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, SyncError> {
        let workspace = self
            .workspaces
            .acquire(&descriptor.repository_url, cancel)
            .await?;
        let result = self.run_in(workspace.root(), artifact, descriptor, cancel).await;
        workspace.close();
        result
    }

    /// Detection only: acquire a workspace and report the decision.
    pub async fn check(
        &self,
        artifact: &Path,
        descriptor: &PublishDescriptor,
        cancel: &CancellationToken,
    ) -> Result<ChangeDecision, SyncError> {
        let workspace = self
            .workspaces
            .acquire(&descriptor.repository_url, cancel)
            .await?;
        let result = detect(workspace.root(), artifact, cancel).await;
        workspace.close();
        result
    }

    async fn run_in(
        &self,
        root: &Path,
        artifact: &Path,
        descriptor: &PublishDescriptor,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, SyncError> {
        let computed = match detect(root, artifact, cancel).await? {
            ChangeDecision::Unchanged { fingerprint } => {
                return Ok(RunOutcome::Skipped { fingerprint });
            }
            ChangeDecision::PublishRequired { fingerprint, .. } => fingerprint,
        };

        let outcome = publish(
            self.toolchain.as_ref(),
            self.env.as_ref(),
            root,
            descriptor,
            artifact,
            cancel,
        )
        .await?;
        let version = match outcome {
            PublishOutcome::Published { version, .. } => version,
            PublishOutcome::BuildFailed => return Ok(RunOutcome::BuildFailed),
        };

        ensure_live(cancel)?;
        // With no prior record the artifact was never hashed; it is staged now.
        let fingerprint = match computed {
            Some(fp) => fp,
            None => fingerprint::compute_file(&descriptor.staged_artifact_path(root)).await?,
        };

        let commit = commit_fingerprint(
            self.git.as_ref(),
            self.env.as_ref(),
            root,
            descriptor,
            &fingerprint,
            &self.commit_message,
            cancel,
        )
        .await?;

        tracing::info!(fingerprint = %fingerprint, version = %version, "complete");
        Ok(RunOutcome::Published {
            fingerprint,
            version,
            commit,
        })
    }
}
