//! `pubgate check` — report the change decision without publishing.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use pubgate_core::RunnerConfig;
use pubgate_sync::{ChangeDecision, ChangeReason};

use crate::runtime::{self, ExitStatus};

/// Arguments for `pubgate check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Compare the lines of this file instead of fetching the certificate bundle.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Repository to check out instead of the configured one.
    #[arg(long, value_name = "URL")]
    pub repository: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn run(self, config: RunnerConfig) -> ExitStatus {
        let delay = Duration::from_millis(config.flush_delay_ms);
        runtime::run_once(delay, |cancel| self.execute(config, cancel))
    }

    async fn execute(self, config: RunnerConfig, cancel: CancellationToken) -> Result<()> {
        let descriptor = super::descriptor(&config, self.repository);
        let payload = super::fetch_payload(&config, self.input.as_deref(), &cancel).await?;

        let result = super::runner(&config)
            .check(&payload, &descriptor, &cancel)
            .await;
        super::discard_payload(&payload).await;
        let decision = result
            .with_context(|| format!("checking {} failed", descriptor.repository_url))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&decision)?);
        } else {
            println!("{}", describe(&decision));
        }
        Ok(())
    }
}

fn describe(decision: &ChangeDecision) -> String {
    match decision {
        ChangeDecision::Unchanged { fingerprint } => format!("unchanged ({fingerprint})"),
        ChangeDecision::PublishRequired {
            reason: ChangeReason::NoRecord,
            ..
        } => "publish required: no stored fingerprint".to_string(),
        ChangeDecision::PublishRequired {
            reason: ChangeReason::Changed { previous },
            fingerprint,
        } => match fingerprint {
            Some(current) => format!("publish required: {previous} -> {current}"),
            None => format!("publish required: {previous} -> ?"),
        },
    }
}
