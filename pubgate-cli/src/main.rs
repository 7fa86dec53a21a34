//! pubgate — fingerprint-gated package publishing.
//!
//! # Usage
//!
//! ```text
//! pubgate [--config FILE] [--log-format text|json] run [--input FILE] [--repository URL]
//! pubgate [--config FILE] check [--input FILE] [--repository URL] [--json]
//! pubgate fingerprint <FILE>
//! ```

mod commands;
mod runtime;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, fingerprint::FingerprintArgs, run::RunArgs};
use pubgate_core::config::DEFAULT_FLUSH_DELAY_MS;
use pubgate_core::{ConfigError, RunnerConfig};
use runtime::{ExitStatus, LogFormat};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "pubgate",
    version,
    about = "Rebuild and publish a package only when its source data changed",
    long_about = None,
)]
struct Cli {
    /// Runner settings (YAML). Defaults apply when omitted.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the payload and publish it if its fingerprint changed.
    Run(RunArgs),

    /// Report whether a run would publish, without building anything.
    Check(CheckArgs),

    /// Print a file's fingerprint as it would be stored in hash.txt.
    Fingerprint(FingerprintArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    runtime::init_tracing(cli.log_format);

    let status = match RunnerConfig::load(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Run(args) => args.run(config),
            Commands::Check(args) => args.run(config),
            Commands::Fingerprint(args) => args.run(config),
        },
        Err(err) => config_failure(err),
    };
    std::process::exit(status.code());
}

/// Without a config there is no configured delay, so the default applies.
fn config_failure(err: ConfigError) -> ExitStatus {
    runtime::run_once(Duration::from_millis(DEFAULT_FLUSH_DELAY_MS), |_cancel| async move {
        Err(anyhow::Error::new(err).context("could not load runner configuration"))
    })
}
