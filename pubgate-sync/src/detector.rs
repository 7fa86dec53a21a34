//! Change detection: stored fingerprint vs. the freshly produced artifact.
//!
//! Decision order:
//! 1. No readable record in the workspace: publish, without hashing yet.
//! 2. Artifact hash equals the record: unchanged.
//! 3. Otherwise: publish, carrying the new hash forward.
//!
//! Detection only reads; it never writes to the workspace.

use std::path::Path;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use pubgate_core::Fingerprint;

use crate::error::{ensure_live, SyncError};
use crate::fingerprint;

/// Why a publish is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeReason {
    /// The workspace holds no fingerprint record.
    NoRecord,
    /// The record differs from the artifact's fingerprint.
    Changed { previous: Fingerprint },
}

/// Outcome of [`detect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ChangeDecision {
    Unchanged {
        fingerprint: Fingerprint,
    },
    PublishRequired {
        reason: ChangeReason,
        /// `None` when there was no record to compare against.
        fingerprint: Option<Fingerprint>,
    },
}

impl ChangeDecision {
    pub fn publish_required(&self) -> bool {
        matches!(self, ChangeDecision::PublishRequired { .. })
    }
}

/// Decide whether `artifact` must be published, given the workspace at `root`.
pub async fn detect(
    root: &Path,
    artifact: &Path,
    cancel: &CancellationToken,
) -> Result<ChangeDecision, SyncError> {
    ensure_live(cancel)?;

    let Some(previous) = fingerprint::read_at(root).await else {
        tracing::info!(
            record = %fingerprint::record_path_at(root).display(),
            "no stored fingerprint, publish required",
        );
        return Ok(ChangeDecision::PublishRequired {
            reason: ChangeReason::NoRecord,
            fingerprint: None,
        });
    };

    ensure_live(cancel)?;
    let current = fingerprint::compute_file(artifact).await?;

    if current == previous {
        tracing::info!(fingerprint = %current, "hashes are equal, skipping publish");
        return Ok(ChangeDecision::Unchanged {
            fingerprint: current,
        });
    }

    tracing::info!(
        previous = %previous,
        current = %current,
        "hashes differ, publish required",
    );
    Ok(ChangeDecision::PublishRequired {
        reason: ChangeReason::Changed { previous },
        fingerprint: Some(current),
    })
}
