//! `pubgate run` — the full run-once publish pipeline.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use pubgate_core::RunnerConfig;
use pubgate_sync::RunOutcome;

use crate::runtime::{self, ExitStatus};

/// Arguments for `pubgate run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Publish the lines of this file instead of fetching the certificate bundle.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Repository to check out instead of the configured one.
    #[arg(long, value_name = "URL")]
    pub repository: Option<String>,
}

impl RunArgs {
    pub fn run(self, config: RunnerConfig) -> ExitStatus {
        let delay = Duration::from_millis(config.flush_delay_ms);
        runtime::run_once(delay, |cancel| self.execute(config, cancel))
    }

    async fn execute(self, config: RunnerConfig, cancel: CancellationToken) -> Result<()> {
        let descriptor = super::descriptor(&config, self.repository);
        let payload = super::fetch_payload(&config, self.input.as_deref(), &cancel).await?;

        let result = super::runner(&config)
            .push_if_changes_needed(&payload, &descriptor, &cancel)
            .await;
        super::discard_payload(&payload).await;
        let outcome = result
            .with_context(|| format!("publish run for {} failed", descriptor.project))?;

        match outcome {
            RunOutcome::Skipped { fingerprint } => {
                tracing::info!(fingerprint = %fingerprint, "nothing to publish");
            }
            RunOutcome::BuildFailed => {
                tracing::warn!(project = %descriptor.project, "build unsuccessful, exiting");
            }
            RunOutcome::Published {
                fingerprint,
                version,
                commit,
            } => {
                tracing::info!(
                    fingerprint = %fingerprint,
                    version = %version,
                    commit = ?commit,
                    "published",
                );
            }
        }
        Ok(())
    }
}
