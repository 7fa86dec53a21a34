//! Runner configuration.
//!
//! Two sources, two shapes:
//! - [`RunnerConfig`] — non-secret settings, YAML on disk, every field defaulted.
//! - [`PublishSettings`] / [`CommitSettings`] — version and credentials, read
//!   from the environment at the point of use. Each loader validates all of
//!   its keys before returning, so a step never starts with half its inputs.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ArtifactName, ProjectName, PublishDescriptor};

/// Environment variable names.
pub mod keys {
    pub const BUILD_VERSION: &str = "BUILD_VERSION";
    pub const REGISTRY_TOKEN: &str = "NUGET__TOKEN";
    pub const GIT_NAME: &str = "GIT__NAME";
    pub const GIT_EMAIL: &str = "GIT__EMAIL";
    pub const REMOTE_USERNAME: &str = "GH__USERNAME";
    pub const REMOTE_TOKEN: &str = "GH__TOKEN";
}

pub const DEFAULT_PROJECT: &str = "Soenneker.Cloudflare.OriginCerts.Thumbprints";
pub const DEFAULT_ARTIFACT: &str = "thumbprints.txt";
pub const DEFAULT_SOURCE_URL: &str =
    "https://developers.cloudflare.com/ssl/static/authenticated_origin_pull_ca.pem";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Updates hash for new version";
pub const DEFAULT_FLUSH_DELAY_MS: u64 = 2000;

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// A credential value. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

// ---------------------------------------------------------------------------
// Environment lookup
// ---------------------------------------------------------------------------

/// Key/value source for the strict settings loaders.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Fetch `key` or fail with [`ConfigError::Missing`]. Blank values count as
/// missing.
pub fn required(env: &dyn EnvSource, key: &'static str) -> Result<String, ConfigError> {
    match env.var(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing { key }),
    }
}

/// Settings the publish pipeline needs once a build has succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    pub version: String,
    pub registry_token: Secret,
}

impl PublishSettings {
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            version: required(env, keys::BUILD_VERSION)?.trim().to_string(),
            registry_token: Secret::new(required(env, keys::REGISTRY_TOKEN)?),
        })
    }
}

/// Identity and credentials for the commit-back step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSettings {
    pub author_name: String,
    pub author_email: String,
    pub remote_username: String,
    pub remote_token: Secret,
}

impl CommitSettings {
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            author_name: required(env, keys::GIT_NAME)?,
            author_email: required(env, keys::GIT_EMAIL)?,
            remote_username: required(env, keys::REMOTE_USERNAME)?,
            remote_token: Secret::new(required(env, keys::REMOTE_TOKEN)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Runner config (YAML)
// ---------------------------------------------------------------------------

/// External build toolchain invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub program: String,
    pub configuration: String,
    pub registry_source: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "dotnet".to_string(),
            configuration: "Release".to_string(),
            registry_source: "https://api.nuget.org/v3/index.json".to_string(),
        }
    }
}

/// Non-secret runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub project: ProjectName,
    pub artifact: ArtifactName,
    /// Defaults to `https://github.com/soenneker/<project lowercased>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    pub source_url: String,
    pub commit_message: String,
    pub flush_delay_ms: u64,
    pub git_program: String,
    pub toolchain: ToolchainConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            project: ProjectName::from(DEFAULT_PROJECT),
            artifact: ArtifactName::from(DEFAULT_ARTIFACT),
            repository_url: None,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            flush_delay_ms: DEFAULT_FLUSH_DELAY_MS,
            git_program: "git".to_string(),
            toolchain: ToolchainConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Load from `path`. The file must exist; absent keys take defaults.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` when given, otherwise return defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_at(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn repository_url(&self) -> String {
        self.repository_url.clone().unwrap_or_else(|| {
            format!(
                "https://github.com/soenneker/{}",
                self.project.0.to_lowercase()
            )
        })
    }

    pub fn descriptor(&self) -> PublishDescriptor {
        PublishDescriptor {
            project: self.project.clone(),
            artifact: self.artifact.clone(),
            repository_url: self.repository_url(),
        }
    }
}
