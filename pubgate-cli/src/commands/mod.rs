pub mod check;
pub mod fingerprint;
pub mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use pubgate_core::{ProcessEnv, PublishDescriptor, RunnerConfig};
use pubgate_fetch::{LinesFileSource, OriginCertFetcher, SourceFetcher};
use pubgate_sync::{GitWorkspaceProvider, PublishRunner};
use pubgate_tools::{fs, DotnetToolchain, GitCli};

/// Descriptor from config, with the repository optionally overridden.
pub fn descriptor(config: &RunnerConfig, repository: Option<String>) -> PublishDescriptor {
    let mut descriptor = config.descriptor();
    if let Some(url) = repository {
        descriptor.repository_url = url;
    }
    descriptor
}

/// Production wiring: git and dotnet executables, process environment.
pub fn runner(config: &RunnerConfig) -> PublishRunner {
    let git = Arc::new(GitCli::new(config.git_program.as_str()));
    PublishRunner::new(
        git.clone(),
        Arc::new(DotnetToolchain::from_config(&config.toolchain)),
        Arc::new(GitWorkspaceProvider::new(git)),
        Arc::new(ProcessEnv),
    )
    .with_commit_message(config.commit_message.as_str())
}

/// Produce the payload and write it to a fresh temp file, one entry per line.
pub async fn fetch_payload(
    config: &RunnerConfig,
    input: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let source: Box<dyn SourceFetcher> = match input {
        Some(path) => Box::new(LinesFileSource::new(path)),
        None => Box::new(OriginCertFetcher::new(config.source_url.as_str())),
    };
    let lines = source
        .fetch(cancel)
        .await
        .with_context(|| format!("fetching payload from {} failed", source.describe()))?;

    let path = fs::write_lines_to_temp(lines.as_slice(), ".txt")
        .await
        .context("writing payload to a temp file failed")?;
    tracing::info!(entries = lines.len(), payload = %path.display(), "payload ready");
    Ok(path)
}

/// Remove the temp payload if the run left it behind.
pub async fn discard_payload(path: &Path) {
    if let Err(err) = fs::delete_if_exists(path).await {
        tracing::debug!(payload = %path.display(), error = %err, "could not remove payload");
    }
}
