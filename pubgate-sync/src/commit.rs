//! Record the new fingerprint in the workspace and push it upstream.

use std::path::Path;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use pubgate_core::{CommitSettings, EnvSource, Fingerprint, PublishDescriptor};
use pubgate_tools::{fs, GitClient};

use crate::error::{ensure_live, SyncError};
use crate::fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    /// A commit was created and pushed.
    Pushed,
    /// The working tree matched `HEAD` after the update.
    NothingToCommit,
}

/// Write `fingerprint` to the record, drop the staged artifact, and commit
/// and push if that left tracked changes.
///
/// Commit identity and the push token are only read when there is something
/// to commit.
pub async fn commit_fingerprint(
    git: &dyn GitClient,
    env: &dyn EnvSource,
    root: &Path,
    descriptor: &PublishDescriptor,
    fingerprint: &Fingerprint,
    message: &str,
    cancel: &CancellationToken,
) -> Result<CommitOutcome, SyncError> {
    ensure_live(cancel)?;
    fingerprint::write_at(root, fingerprint).await?;
    fs::delete_if_exists(&descriptor.staged_artifact_path(root)).await?;

    ensure_live(cancel)?;
    let record = fingerprint::record_path_at(root);
    git.add_if_untracked(root, &record, cancel).await?;

    ensure_live(cancel)?;
    if !git.is_dirty(root, cancel).await? {
        tracing::info!("there are no changes to commit");
        return Ok(CommitOutcome::NothingToCommit);
    }

    tracing::info!(
        fingerprint = %fingerprint,
        "changes detected in repository, committing and pushing",
    );
    let settings = CommitSettings::load(env)?;

    ensure_live(cancel)?;
    git.commit(root, message, &settings, cancel).await?;

    ensure_live(cancel)?;
    git.push(root, &settings, cancel).await?;

    Ok(CommitOutcome::Pushed)
}
