//! Process host: tracing setup, the tokio runtime, shutdown signals and exit status.

use std::future::Future;
use std::time::Duration;

use clap::ValueEnum;
use tokio_util::sync::CancellationToken;

use pubgate_fetch::FetchError;
use pubgate_sync::SyncError;
use pubgate_tools::ToolError;

/// How a run ended, as reported to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    /// Interrupted before completion.
    Unknown,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::Unknown => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Run `job` to completion on a fresh runtime and decide the exit status.
///
/// Ctrl-c (or SIGTERM on unix) cancels the token handed to `job`; the job
/// is still awaited so scoped resources unwind. On failure the thread sleeps for `flush_delay`
/// before returning.
pub fn run_once<F, Fut>(flush_delay: Duration, job: F) -> ExitStatus
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start tokio runtime");
            return ExitStatus::Failure;
        }
    };

    runtime.block_on(async move {
        let cancel = CancellationToken::new();
        let interrupted = CancellationToken::new();

        let signal_handle = {
            let cancel = cancel.clone();
            let interrupted = interrupted.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    signal = shutdown_signal() => match signal {
                        Ok(name) => {
                            tracing::warn!(signal = name, "received shutdown signal, cancelling run");
                            interrupted.cancel();
                            cancel.cancel();
                        }
                        Err(err) => tracing::error!(error = %err, "signal handler failed"),
                    }
                }
            })
        };

        let result = job(cancel.clone()).await;
        // Releases the signal task when the job finished on its own.
        cancel.cancel();
        let _ = signal_handle.await;

        let status = classify(&result, interrupted.is_cancelled());
        match (&result, status) {
            (Err(err), ExitStatus::Unknown) => {
                tracing::warn!(error = %format!("{err:#}"), "run cancelled before completion");
            }
            (Err(err), _) => {
                tracing::error!(error = %format!("{err:#}"), "run failed");
                tokio::time::sleep(flush_delay).await;
            }
            (Ok(()), _) => {}
        }
        status
    })
}

/// Resolves with the signal's name once SIGINT or SIGTERM arrives.
#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}

/// Success, failure, or "unknown" when the error came from cancellation.
pub fn classify(result: &anyhow::Result<()>, interrupted: bool) -> ExitStatus {
    match result {
        Ok(()) => ExitStatus::Success,
        Err(_) if interrupted => ExitStatus::Unknown,
        Err(err) if is_cancellation(err) => ExitStatus::Unknown,
        Err(_) => ExitStatus::Failure,
    }
}

fn is_cancellation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<SyncError>()
            .is_some_and(SyncError::is_cancelled)
            || matches!(cause.downcast_ref::<ToolError>(), Some(ToolError::Cancelled))
            || matches!(cause.downcast_ref::<FetchError>(), Some(FetchError::Cancelled))
    })
}
