//! Git plumbing for the managed repository.
//!
//! [`GitClient`] is the seam the pipeline depends on; [`GitCli`] drives the
//! `git` binary. Credentials never reach a command line: commit identity goes
//! through `GIT_AUTHOR_*`/`GIT_COMMITTER_*` and the push token through
//! `GIT_CONFIG_*` environment entries.

use std::path::Path;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pubgate_core::{CommitSettings, Secret};
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;
use crate::process::{self, CommandSpec};

/// Version-control operations needed by one run.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Clone `url` into `dest` (which must not exist or be empty).
    async fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;

    /// Stage `file` if git does not track it yet. Returns whether it was added.
    async fn add_if_untracked(
        &self,
        repo: &Path,
        file: &Path,
        cancel: &CancellationToken,
    ) -> Result<bool, ToolError>;

    /// Whether tracked files (staged or not) differ from `HEAD`.
    async fn is_dirty(&self, repo: &Path, cancel: &CancellationToken) -> Result<bool, ToolError>;

    /// Commit all changes to tracked files.
    async fn commit(
        &self,
        repo: &Path,
        message: &str,
        settings: &CommitSettings,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;

    /// Push the current branch to its upstream.
    async fn push(
        &self,
        repo: &Path,
        settings: &CommitSettings,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;
}

/// [`GitClient`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.program).env("GIT_TERMINAL_PROMPT", "0")
    }

    fn in_repo(&self, repo: &Path) -> CommandSpec {
        self.command().current_dir(repo)
    }
}

/// `AUTHORIZATION: basic <base64(user:token)>` for `http.extraHeader`.
pub fn basic_auth_header(username: &str, token: &Secret) -> Secret {
    let encoded = STANDARD.encode(format!("{username}:{}", token.expose()));
    Secret::new(format!("AUTHORIZATION: basic {encoded}"))
}

fn relative_to<'a>(repo: &Path, file: &'a Path) -> &'a Path {
    file.strip_prefix(repo).unwrap_or(file)
}

#[async_trait]
impl GitClient for GitCli {
    async fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        let spec = self.command().arg("clone").arg(url).path_arg(dest);
        process::run_checked(&spec, cancel).await?;
        tracing::debug!(url, dest = %dest.display(), "cloned repository");
        Ok(())
    }

    async fn add_if_untracked(
        &self,
        repo: &Path,
        file: &Path,
        cancel: &CancellationToken,
    ) -> Result<bool, ToolError> {
        let rel = relative_to(repo, file);
        let ls_files = self
            .in_repo(repo)
            .args(["ls-files", "--error-unmatch", "--"])
            .path_arg(rel);
        if process::run(&ls_files, cancel).await?.success {
            return Ok(false);
        }

        let add = self.in_repo(repo).args(["add", "--"]).path_arg(rel);
        process::run_checked(&add, cancel).await?;
        tracing::debug!(file = %rel.display(), "staged untracked file");
        Ok(true)
    }

    async fn is_dirty(&self, repo: &Path, cancel: &CancellationToken) -> Result<bool, ToolError> {
        let spec = self
            .in_repo(repo)
            .args(["status", "--porcelain", "--untracked-files=no"]);
        let output = process::run_checked(&spec, cancel).await?;
        Ok(!output.stdout.trim().is_empty())
    }

    async fn commit(
        &self,
        repo: &Path,
        message: &str,
        settings: &CommitSettings,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        let stage = self.in_repo(repo).args(["add", "--update"]);
        process::run_checked(&stage, cancel).await?;

        let spec = self
            .in_repo(repo)
            .args(["-c", "commit.gpgsign=false", "commit", "-m"])
            .arg(message)
            .env("GIT_AUTHOR_NAME", &settings.author_name)
            .env("GIT_AUTHOR_EMAIL", &settings.author_email)
            .env("GIT_COMMITTER_NAME", &settings.author_name)
            .env("GIT_COMMITTER_EMAIL", &settings.author_email);
        process::run_checked(&spec, cancel).await?;
        Ok(())
    }

    async fn push(
        &self,
        repo: &Path,
        settings: &CommitSettings,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        let header = basic_auth_header(&settings.remote_username, &settings.remote_token);
        let spec = self
            .in_repo(repo)
            .arg("push")
            .env("GIT_CONFIG_COUNT", "1")
            .env("GIT_CONFIG_KEY_0", "http.extraHeader")
            .secret_env("GIT_CONFIG_VALUE_0", header);
        process::run_checked(&spec, cancel).await?;
        Ok(())
    }
}
