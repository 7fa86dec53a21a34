//! `pubgate fingerprint` — print a file's fingerprint.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use pubgate_core::RunnerConfig;
use pubgate_sync::fingerprint;

use crate::runtime::{self, ExitStatus};

/// Arguments for `pubgate fingerprint`.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// File to hash.
    pub file: PathBuf,
}

impl FingerprintArgs {
    pub fn run(self, config: RunnerConfig) -> ExitStatus {
        let delay = Duration::from_millis(config.flush_delay_ms);
        runtime::run_once(delay, |_cancel| self.execute())
    }

    async fn execute(self) -> Result<()> {
        let fp = fingerprint::compute_file(&self.file)
            .await
            .with_context(|| format!("could not fingerprint {}", self.file.display()))?;
        println!("{fp}");
        Ok(())
    }
}
