//! Stage the artifact, build the project, pack and push the package.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use pubgate_core::{EnvSource, PublishDescriptor, PublishSettings};
use pubgate_tools::{fs, Toolchain};

use crate::error::{ensure_live, SyncError};

/// Result of [`publish`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "publish", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The package was pushed to the registry.
    Published { package: PathBuf, version: String },
    /// The build reported failure; nothing was packed or pushed.
    BuildFailed,
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// Run the publish steps in order, stopping at the first failure.
///
/// `artifact` is moved into the workspace; it does not exist afterwards. A
/// failed build is reported as [`PublishOutcome::BuildFailed`], not an error.
pub async fn publish(
    toolchain: &dyn Toolchain,
    env: &dyn EnvSource,
    root: &Path,
    descriptor: &PublishDescriptor,
    artifact: &Path,
    cancel: &CancellationToken,
) -> Result<PublishOutcome, SyncError> {
    let staged = descriptor.staged_artifact_path(root);
    let project_file = descriptor.project_file_path(root);

    ensure_live(cancel)?;
    fs::delete_if_exists(&staged).await?;
    if let Some(dir) = staged.parent() {
        fs::ensure_dir(dir).await?;
    }
    fs::move_file(artifact, &staged).await?;
    tracing::debug!(staged = %staged.display(), "staged artifact");

    ensure_live(cancel)?;
    toolchain.restore(&project_file, cancel).await?;

    ensure_live(cancel)?;
    if !toolchain.build(&project_file, cancel).await? {
        tracing::error!(
            project = %descriptor.project,
            "build was not successful, skipping publish",
        );
        return Ok(PublishOutcome::BuildFailed);
    }

    // Both keys are checked before anything leaves the machine.
    let settings = PublishSettings::load(env)?;

    ensure_live(cancel)?;
    let package = toolchain
        .pack(
            &project_file,
            &descriptor.project,
            &settings.version,
            root,
            cancel,
        )
        .await?;

    ensure_live(cancel)?;
    toolchain
        .push(&package, &settings.registry_token, cancel)
        .await?;

    tracing::info!(
        package = %package.display(),
        version = %settings.version,
        "package pushed",
    );
    Ok(PublishOutcome::Published {
        package,
        version: settings.version,
    })
}
