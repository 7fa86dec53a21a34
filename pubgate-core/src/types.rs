//! Domain types for the conditional-publish pipeline.
//!
//! All path-returning helpers take the workspace root explicitly; nothing in
//! this module touches the filesystem.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed project/package identity (e.g. the `.csproj` stem).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// File name of the artifact once staged under `src/Resources/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactName(pub String);

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ArtifactName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ArtifactName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Content fingerprint of an artifact, as stored in `hash.txt`.
///
/// Comparison is textual: two fingerprints are equal when their trimmed
/// strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    /// Build a fingerprint from a stored record, trimming surrounding
    /// whitespace. Returns `None` when nothing but whitespace remains.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Publish descriptor
// ---------------------------------------------------------------------------

/// Identity of the deliverable a run publishes.
///
/// The version tag is not part of the descriptor; it is read from the
/// environment only once a build has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDescriptor {
    pub project: ProjectName,
    pub artifact: ArtifactName,
    pub repository_url: String,
}

impl PublishDescriptor {
    pub fn new(
        project: impl Into<ProjectName>,
        artifact: impl Into<ArtifactName>,
        repository_url: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            artifact: artifact.into(),
            repository_url: repository_url.into(),
        }
    }

    /// `<root>/src/Resources/<artifact>`
    pub fn staged_artifact_path(&self, root: &Path) -> PathBuf {
        paths::staged_artifact_path_at(root, &self.artifact)
    }

    /// `<root>/src/<project>.csproj`
    pub fn project_file_path(&self, root: &Path) -> PathBuf {
        paths::project_file_path_at(root, &self.project)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
