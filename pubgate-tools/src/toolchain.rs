//! Package toolchain: restore, build, pack, push.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pubgate_core::config::ToolchainConfig;
use pubgate_core::paths::package_path_at;
use pubgate_core::{ProjectName, Secret};
use tokio_util::sync::CancellationToken;

use crate::error::{io_err, ToolError};
use crate::process::{self, CommandSpec};

/// Build-and-publish operations on a project file.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Restore dependencies. Any failure is an error.
    async fn restore(&self, project_file: &Path, cancel: &CancellationToken)
        -> Result<(), ToolError>;

    /// Build in release configuration. A failed build is `Ok(false)`; only a
    /// failure to run the build at all is an error.
    async fn build(&self, project_file: &Path, cancel: &CancellationToken)
        -> Result<bool, ToolError>;

    /// Pack the built project with `version` into `out_dir`, returning the
    /// package path.
    async fn pack(
        &self,
        project_file: &Path,
        project: &ProjectName,
        version: &str,
        out_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ToolError>;

    /// Push `package` to the registry.
    async fn push(
        &self,
        package: &Path,
        token: &Secret,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;
}

/// [`Toolchain`] backed by the `dotnet` CLI.
#[derive(Debug, Clone)]
pub struct DotnetToolchain {
    program: String,
    configuration: String,
    registry_source: String,
}

impl Default for DotnetToolchain {
    fn default() -> Self {
        Self::from_config(&ToolchainConfig::default())
    }
}

impl DotnetToolchain {
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self {
            program: config.program.clone(),
            configuration: config.configuration.clone(),
            registry_source: config.registry_source.clone(),
        }
    }

    fn command(&self, project_file: &Path) -> CommandSpec {
        let spec = CommandSpec::new(&self.program).env("DOTNET_CLI_TELEMETRY_OPTOUT", "1");
        match project_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => spec.current_dir(dir),
            _ => spec,
        }
    }

    pub fn restore_spec(&self, project_file: &Path) -> CommandSpec {
        self.command(project_file)
            .arg("restore")
            .path_arg(project_file)
    }

    pub fn build_spec(&self, project_file: &Path) -> CommandSpec {
        self.command(project_file)
            .arg("build")
            .path_arg(project_file)
            .args(["--configuration", self.configuration.as_str(), "--no-restore"])
    }

    pub fn pack_spec(&self, project_file: &Path, version: &str, out_dir: &Path) -> CommandSpec {
        self.command(project_file)
            .arg("pack")
            .path_arg(project_file)
            .args(["--configuration", self.configuration.as_str(), "--no-build", "--no-restore"])
            .arg(format!("-p:PackageVersion={version}"))
            .arg("--output")
            .path_arg(out_dir)
    }

    pub fn push_spec(&self, package: &Path, token: &Secret) -> CommandSpec {
        self.command(package)
            .args(["nuget", "push"])
            .path_arg(package)
            .arg("--api-key")
            .secret_arg(token)
            .args(["--source", self.registry_source.as_str()])
    }
}

#[async_trait]
impl Toolchain for DotnetToolchain {
    async fn restore(
        &self,
        project_file: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        process::run_checked(&self.restore_spec(project_file), cancel).await?;
        Ok(())
    }

    async fn build(
        &self,
        project_file: &Path,
        cancel: &CancellationToken,
    ) -> Result<bool, ToolError> {
        let output = process::run(&self.build_spec(project_file), cancel).await?;
        if !output.success {
            tracing::warn!(
                exit_code = ?output.exit_code,
                stdout = %output.stdout.trim(),
                stderr = %output.stderr.trim(),
                "build reported failure",
            );
        }
        Ok(output.success)
    }

    async fn pack(
        &self,
        project_file: &Path,
        project: &ProjectName,
        version: &str,
        out_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ToolError> {
        process::run_checked(&self.pack_spec(project_file, version, out_dir), cancel).await?;
        let package = package_path_at(out_dir, project, version);
        tokio::fs::metadata(&package)
            .await
            .map_err(|e| io_err(&package, e))?;
        Ok(package)
    }

    async fn push(
        &self,
        package: &Path,
        token: &Secret,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        process::run_checked(&self.push_spec(package, token), cancel).await?;
        Ok(())
    }
}
