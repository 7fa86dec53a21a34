//! # pubgate-tools
//!
//! Collaborators the publish pipeline drives: external processes, file
//! operations, git, and the package toolchain. Everything that suspends takes
//! a [`CancellationToken`](tokio_util::sync::CancellationToken).

pub mod error;
pub mod fs;
pub mod git;
pub mod process;
pub mod toolchain;

pub use error::ToolError;
pub use git::{GitCli, GitClient};
pub use process::{CommandOutput, CommandSpec};
pub use toolchain::{DotnetToolchain, Toolchain};
