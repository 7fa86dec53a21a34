//! Fixed layout inside a managed repository.
//!
//! ```text
//! <repo>/
//!   hash.txt                     (stored fingerprint, one line)
//!   <project>.<version>.nupkg    (pack output, never committed)
//!   src/
//!     <project>.csproj
//!     Resources/<artifact>       (transient, removed before commit)
//! ```

use std::path::{Path, PathBuf};

use crate::types::{ArtifactName, ProjectName};

pub const FINGERPRINT_FILE: &str = "hash.txt";
pub const SOURCE_DIR: &str = "src";
pub const RESOURCES_DIR: &str = "Resources";
pub const PROJECT_FILE_EXTENSION: &str = "csproj";
pub const PACKAGE_EXTENSION: &str = "nupkg";

pub fn fingerprint_path_at(root: &Path) -> PathBuf {
    root.join(FINGERPRINT_FILE)
}

pub fn resources_dir_at(root: &Path) -> PathBuf {
    root.join(SOURCE_DIR).join(RESOURCES_DIR)
}

pub fn staged_artifact_path_at(root: &Path, artifact: &ArtifactName) -> PathBuf {
    resources_dir_at(root).join(&artifact.0)
}

pub fn project_file_path_at(root: &Path, project: &ProjectName) -> PathBuf {
    root.join(SOURCE_DIR)
        .join(format!("{}.{PROJECT_FILE_EXTENSION}", project.0))
}

pub fn package_path_at(out_dir: &Path, project: &ProjectName, version: &str) -> PathBuf {
    out_dir.join(format!("{}.{version}.{PACKAGE_EXTENSION}", project.0))
}
