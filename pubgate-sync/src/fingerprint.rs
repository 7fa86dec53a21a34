//! Fingerprint record: a single line in `hash.txt` at the repository root.
//!
//! Reads are tolerant (a missing or unreadable record is simply absent);
//! writes replace the record outright.

use std::path::{Path, PathBuf};

use sha3::{Digest, Sha3_256};
use tokio::io::AsyncReadExt;

use pubgate_core::paths::fingerprint_path_at;
use pubgate_core::Fingerprint;
use pubgate_tools::fs;

use crate::error::{io_err, SyncError};

/// `<root>/hash.txt`
pub fn record_path_at(root: &Path) -> PathBuf {
    fingerprint_path_at(root)
}

/// Stored fingerprint under `root`, if there is a non-blank one.
pub async fn read_at(root: &Path) -> Option<Fingerprint> {
    let raw = fs::try_read_trimmed(&record_path_at(root)).await?;
    Fingerprint::from_stored(&raw)
}

/// Replace the record under `root` with `fingerprint` and nothing else.
pub async fn write_at(root: &Path, fingerprint: &Fingerprint) -> Result<(), SyncError> {
    let path = record_path_at(root);
    fs::delete_if_exists(&path).await?;
    fs::write_atomic(&path, fingerprint.as_str()).await?;
    Ok(())
}

/// SHA3-256 over the full byte content of `path`, lowercase hex.
pub async fn compute_file(path: &Path) -> Result<Fingerprint, SyncError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| io_err(path, e))?;
    let mut hasher = Sha3_256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await.map_err(|e| io_err(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint(hex::encode(hasher.finalize())))
}

/// [`compute_file`] for in-memory content.
pub fn compute_bytes(bytes: &[u8]) -> Fingerprint {
    let mut hasher = Sha3_256::new();
    hasher.update(bytes);
    Fingerprint(hex::encode(hasher.finalize()))
}
