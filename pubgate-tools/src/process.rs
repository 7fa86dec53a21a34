//! External process execution.
//!
//! A [`CommandSpec`] describes one invocation. Arguments and environment
//! entries can be marked secret; secrets are passed to the child verbatim but
//! print as `***` wherever the spec is displayed or logged.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use pubgate_core::Secret;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;

#[derive(Debug, Clone)]
enum Value {
    Plain(String),
    Secret(Secret),
}

impl Value {
    fn raw(&self) -> &str {
        match self {
            Value::Plain(s) => s,
            Value::Secret(s) => s.expose(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Plain(s) => f.write_str(s),
            Value::Secret(_) => f.write_str("***"),
        }
    }
}

/// One external command invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<Value>,
    envs: Vec<(String, Value)>,
    cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Value::Plain(arg.into()));
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|a| Value::Plain(a.into())));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn secret_arg(mut self, secret: &Secret) -> Self {
        self.args.push(Value::Secret(secret.clone()));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), Value::Plain(value.into())));
        self
    }

    pub fn secret_env(mut self, key: impl Into<String>, secret: Secret) -> Self {
        self.envs.push((key.into(), Value::Secret(secret)));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(Value::raw))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.envs {
            cmd.env(key, value.raw());
        }
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn from_output(output: &Output, duration: Duration) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Turn a non-zero exit into [`ToolError::Failed`].
    pub fn ok(self, spec: &CommandSpec) -> Result<Self, ToolError> {
        if self.success {
            return Ok(self);
        }
        let stderr = if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        };
        Err(ToolError::Failed {
            command: spec.to_string(),
            code: self.exit_code,
            stderr,
        })
    }
}

/// Run `spec` to completion, capturing output.
///
/// A non-zero exit is returned as `Ok` with `success == false`; use
/// [`CommandOutput::ok`] to make it an error. If `cancel` fires first the
/// child is killed and [`ToolError::Cancelled`] is returned.
pub async fn run(spec: &CommandSpec, cancel: &CancellationToken) -> Result<CommandOutput, ToolError> {
    if cancel.is_cancelled() {
        return Err(ToolError::Cancelled);
    }

    tracing::debug!(command = %spec, "running command");
    let started = Instant::now();
    let mut cmd = spec.to_command();

    let output = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ToolError::Cancelled),
        output = cmd.output() => output.map_err(|source| ToolError::Spawn {
            program: spec.program.clone(),
            source,
        })?,
    };

    let result = CommandOutput::from_output(&output, started.elapsed());
    tracing::debug!(
        command = %spec,
        exit_code = ?result.exit_code,
        duration_ms = result.duration_ms,
        "command finished",
    );
    Ok(result)
}

/// Run `spec` and require a zero exit code.
pub async fn run_checked(
    spec: &CommandSpec,
    cancel: &CancellationToken,
) -> Result<CommandOutput, ToolError> {
    run(spec, cancel).await?.ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_redacts_secret_args() {
        let spec = CommandSpec::new("dotnet")
            .args(["nuget", "push", "pkg.nupkg", "--api-key"])
            .secret_arg(&Secret::new("oy2-very-secret"))
            .secret_env("GIT_CONFIG_VALUE_0", Secret::new("basic abc"));
        let shown = spec.to_string();
        assert_eq!(shown, "dotnet nuget push pkg.nupkg --api-key ***");
        assert!(!format!("{spec:?}").contains("oy2-very-secret"));
    }

    #[test]
    fn failed_output_uses_stdout_when_stderr_empty() {
        let spec = CommandSpec::new("tool").arg("build");
        let output = CommandOutput {
            success: false,
            exit_code: Some(1),
            stdout: "error CS1002: ; expected\n".to_string(),
            stderr: String::new(),
            duration_ms: 3,
        };
        match output.ok(&spec).unwrap_err() {
            ToolError::Failed { command, code, stderr } => {
                assert_eq!(command, "tool build");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "error CS1002: ; expected");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_captures_exit_code_and_output() {
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = run(&spec, &CancellationToken::new()).await.expect("run");
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_passes_secret_env_to_child() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "printf %s \"$PUBGATE_TEST_SECRET\""])
            .secret_env("PUBGATE_TEST_SECRET", Secret::new("s3cr3t"));
        let output = run_checked(&spec, &CancellationToken::new())
            .await
            .expect("run");
        assert_eq!(output.stdout, "s3cr3t");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_stops_a_running_child() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let spec = CommandSpec::new("sh").args(["-c", "sleep 30"]);
        let err = run(&spec, &cancel).await.unwrap_err();
        assert!(matches!(err, ToolError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn already_cancelled_token_never_spawns() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let spec = CommandSpec::new("definitely-not-a-real-program-pubgate");
        assert!(matches!(run(&spec, &cancel).await, Err(ToolError::Cancelled)));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let spec = CommandSpec::new("definitely-not-a-real-program-pubgate");
        let err = run(&spec, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }), "got: {err}");
    }
}
