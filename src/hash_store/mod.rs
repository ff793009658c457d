//! Hash store
//!
//! Persists the two sets of content hashes used to detect previously seen
//! input: whole-file hashes and individual line hashes. Each set is a JSON
//! array of hex SHA-256 digests at its own path. The sets grow
//! monotonically and are never pruned.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// SHA-256 content hash of a string, hex encoded. Used purely for
/// identity and deduplication, not security.
pub fn content_hash(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// How one hash set came up during `load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetStatus {
    /// Backing file existed and parsed; holds the number of hashes read.
    Loaded(usize),
    /// Backing file absent; the set starts empty. Not an error.
    Missing,
    /// Read or parse failed; the set starts empty and duplicates may go
    /// undetected.
    Degraded(String),
}

/// Load outcome for both sets, reported alongside the store so the caller
/// decides whether a degraded start is acceptable.
#[derive(Debug, Clone)]
pub struct LoadStatus {
    pub file_hashes: SetStatus,
    pub line_hashes: SetStatus,
}

impl LoadStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self.file_hashes, SetStatus::Degraded(_))
            || matches!(self.line_hashes, SetStatus::Degraded(_))
    }
}

/// Persistent store of file and line content hashes.
#[derive(Debug)]
pub struct HashStore {
    file_hashes: HashSet<String>,
    line_hashes: HashSet<String>,
    file_hashes_path: PathBuf,
    line_hashes_path: PathBuf,
}

impl HashStore {
    /// Read both hash collections from their configured paths.
    pub async fn load(file_hashes_path: PathBuf, line_hashes_path: PathBuf) -> (Self, LoadStatus) {
        let (file_hashes, file_status) = load_set(&file_hashes_path).await;
        let (line_hashes, line_status) = load_set(&line_hashes_path).await;

        let store = Self {
            file_hashes,
            line_hashes,
            file_hashes_path,
            line_hashes_path,
        };
        let status = LoadStatus {
            file_hashes: file_status,
            line_hashes: line_status,
        };
        (store, status)
    }

    pub fn has_file(&self, hash: &str) -> bool {
        self.file_hashes.contains(hash)
    }

    pub fn has_line(&self, hash: &str) -> bool {
        self.line_hashes.contains(hash)
    }

    pub fn file_count(&self) -> usize {
        self.file_hashes.len()
    }

    pub fn line_count(&self) -> usize {
        self.line_hashes.len()
    }

    /// Union the given hashes into the persistent sets, then write both
    /// sets back. Write failures are logged, not propagated: the
    /// in-memory state already reflects the update.
    pub async fn add_all(
        &mut self,
        new_file_hashes: &HashSet<String>,
        new_line_hashes: &HashSet<String>,
    ) {
        self.file_hashes.extend(new_file_hashes.iter().cloned());
        self.line_hashes.extend(new_line_hashes.iter().cloned());

        if let Err(e) = write_set(&self.file_hashes_path, &self.file_hashes).await {
            tracing::error!(
                path = %self.file_hashes_path.display(),
                error = %e,
                "failed to persist file hashes"
            );
        }
        if let Err(e) = write_set(&self.line_hashes_path, &self.line_hashes).await {
            tracing::error!(
                path = %self.line_hashes_path.display(),
                error = %e,
                "failed to persist line hashes"
            );
        }
    }
}

async fn load_set(path: &Path) -> (HashSet<String>, SetStatus) {
    match tokio::fs::read_to_string(path).await {
        Ok(data) => match serde_json::from_str::<Vec<String>>(&data) {
            Ok(hashes) => {
                let set: HashSet<String> = hashes.into_iter().collect();
                let count = set.len();
                (set, SetStatus::Loaded(count))
            }
            Err(e) => (HashSet::new(), SetStatus::Degraded(e.to_string())),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => (HashSet::new(), SetStatus::Missing),
        Err(e) => (HashSet::new(), SetStatus::Degraded(e.to_string())),
    }
}

async fn write_set(path: &Path, set: &HashSet<String>) -> anyhow::Result<()> {
    let hashes: Vec<&String> = set.iter().collect();
    let data = serde_json::to_string(&hashes)?;
    tokio::fs::write(path, data).await?;
    Ok(())
}
