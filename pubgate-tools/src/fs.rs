//! File operations used by the pipeline.
//!
//! All helpers are idempotent where the name says so: deleting a missing file
//! and creating an existing directory are not errors.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ToolError};

/// Remove `path` if present. Returns whether a file was removed.
pub async fn delete_if_exists(path: &Path) -> Result<bool, ToolError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "deleted file");
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Create `dir` and any missing parents.
pub async fn ensure_dir(dir: &Path) -> Result<(), ToolError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| io_err(dir, e))
}

/// Move `from` to `to`. The source no longer exists afterwards.
///
/// Tries a rename first; when that fails (typically across filesystems, e.g.
/// system temp dir to a checkout elsewhere) falls back to copy + remove.
pub async fn move_file(from: &Path, to: &Path) -> Result<(), ToolError> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => return Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(io_err(from, err)),
        Err(err) => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                error = %err,
                "rename failed, copying instead",
            );
        }
    }

    tokio::fs::copy(from, to)
        .await
        .map_err(|e| io_err(to, e))?;
    tokio::fs::remove_file(from)
        .await
        .map_err(|e| io_err(from, e))
}

/// Read `path` and trim surrounding whitespace. Any read failure yields `None`.
pub async fn try_read_trimmed(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Some(contents.trim().to_string()),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "could not read file");
            None
        }
    }
}

/// Write `contents` to `<path>.pubgate.tmp`, then rename over `path`.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), ToolError> {
    let tmp = PathBuf::from(format!("{}.pubgate.tmp", path.display()));
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(path, e));
    }
    Ok(())
}

/// One entry per line, each followed by `\n`.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.as_ref());
        out.push('\n');
    }
    out
}

/// Serialize `lines` into a fresh, uniquely named file in the system temp
/// directory and return its path. The file is not deleted automatically.
pub async fn write_lines_to_temp<S: AsRef<str>>(
    lines: &[S],
    suffix: &str,
) -> Result<PathBuf, ToolError> {
    let temp_dir = std::env::temp_dir();
    let file = tempfile::Builder::new()
        .prefix("pubgate-")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| io_err(&temp_dir, e))?;
    let path = file
        .into_temp_path()
        .keep()
        .map_err(|e| io_err(&temp_dir, e.error))?;

    tokio::fs::write(&path, join_lines(lines))
        .await
        .map_err(|e| io_err(&path, e))?;
    Ok(path)
}
