//! pubgate core library — domain types, repository layout, configuration, errors.
//!
//! - [`types`] — newtypes and the publish descriptor
//! - [`paths`] — fixed file layout inside a managed repository
//! - [`config`] — runner settings (YAML) and strict environment lookups
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use config::{CommitSettings, EnvSource, ProcessEnv, PublishSettings, RunnerConfig, Secret};
pub use error::ConfigError;
pub use types::{ArtifactName, Fingerprint, ProjectName, PublishDescriptor};
