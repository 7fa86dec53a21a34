//! # pubgate-sync
//!
//! Fingerprint-gated publish orchestration.
//!
//! [`PublishRunner::push_if_changes_needed`] checks out the managed
//! repository, compares the new artifact against the stored fingerprint, and
//! only when they differ builds, packs and pushes the package before
//! committing the new fingerprint back.

pub mod commit;
pub mod detector;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod publish;
pub mod workspace;

pub use commit::{commit_fingerprint, CommitOutcome};
pub use detector::{detect, ChangeDecision, ChangeReason};
pub use error::SyncError;
pub use pipeline::{PublishRunner, RunOutcome};
pub use publish::{publish, PublishOutcome};
pub use workspace::{GitWorkspaceProvider, Workspace, WorkspaceProvider};
