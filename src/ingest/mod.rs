//! Deduplicating ingest pipeline
//!
//! Orchestrates a batch of staged files: whole-file and per-line
//! duplicate detection against the persistent hash store and the
//! batch-local sets, strict record parsing, and application to the shared
//! aggregate. Files of one batch are processed strictly in order; an
//! unreadable or malformed unit is logged and skipped, never failing the
//! batch.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::aggregate::OrderStore;
use crate::domain::{LegacyRecord, User};
use crate::hash_store::{content_hash, HashStore};

/// A file staged on disk, ready for ingestion.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub path: PathBuf,
    pub filename: String,
}

/// Everything one ingest call produced.
#[derive(Debug)]
pub struct IngestBatch {
    /// One entry per processed line: the owning user as of the end of
    /// the batch. Users touched by several lines appear several times.
    pub users: Vec<User>,
    /// Hashes first seen in this batch. Merged into the persistent store
    /// by the caller, only after a successful batch that produced users.
    pub new_file_hashes: HashSet<String>,
    pub new_line_hashes: HashSet<String>,
}

/// Drives a batch of staged files through dedup, parsing and aggregation.
pub struct IngestPipeline {
    store: Arc<RwLock<OrderStore>>,
    hashes: Arc<RwLock<HashStore>>,
    delete_files: bool,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<RwLock<OrderStore>>,
        hashes: Arc<RwLock<HashStore>>,
        delete_files: bool,
    ) -> Self {
        Self {
            store,
            hashes,
            delete_files,
        }
    }

    /// Process the staged files in order and return the batch result.
    pub async fn ingest(&self, files: &[StagedFile]) -> IngestBatch {
        tracing::info!(files = files.len(), "ingest batch started");

        let mut new_file_hashes = HashSet::new();
        let mut new_line_hashes = HashSet::new();
        // userId per processed line; resolved to snapshots at the end.
        let mut touched: Vec<i64> = Vec::new();

        for file in files {
            let data = match tokio::fs::read_to_string(&file.path).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::error!(
                        path = %file.path.display(),
                        error = %e,
                        "error reading staged file, skipping"
                    );
                    continue;
                }
            };

            if data.is_empty() {
                tracing::warn!(path = %file.path.display(), "file is empty, skipping");
                continue;
            }

            let file_hash = content_hash(&data);
            let seen = {
                let hashes = self.hashes.read().await;
                hashes.has_file(&file_hash) || new_file_hashes.contains(&file_hash)
            };
            if seen {
                tracing::info!(
                    filename = %file.filename,
                    hash = %file_hash,
                    "skipping duplicated file"
                );
                continue;
            }
            new_file_hashes.insert(file_hash);

            self.parse_legacy_data(&data, &mut new_line_hashes, &mut touched)
                .await;

            if self.delete_files {
                if let Err(e) = tokio::fs::remove_file(&file.path).await {
                    tracing::warn!(
                        path = %file.path.display(),
                        error = %e,
                        "failed to remove staged file"
                    );
                }
            }
            tracing::debug!(path = %file.path.display(), "file processed");
        }

        let users = {
            let store = self.store.read().await;
            touched
                .iter()
                .filter_map(|user_id| store.get(*user_id).cloned())
                .collect()
        };

        tracing::info!(processed_lines = touched.len(), "ingest batch finished");

        IngestBatch {
            users,
            new_file_hashes,
            new_line_hashes,
        }
    }

    /// Fold every new, well-formed line of one file into the aggregate.
    async fn parse_legacy_data(
        &self,
        data: &str,
        new_line_hashes: &mut HashSet<String>,
        touched: &mut Vec<i64>,
    ) {
        for (index, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let line_hash = content_hash(line);
            let seen = {
                let hashes = self.hashes.read().await;
                hashes.has_line(&line_hash) || new_line_hashes.contains(&line_hash)
            };
            if seen {
                tracing::debug!(hash = %line_hash, "skipping duplicated line");
                continue;
            }
            new_line_hashes.insert(line_hash);

            match LegacyRecord::parse(line) {
                Ok(record) => {
                    let mut store = self.store.write().await;
                    store.apply(&record);
                    touched.push(record.user_id);
                }
                Err(e) => {
                    tracing::warn!(line = index + 1, error = %e, "malformed record, skipping");
                }
            }
        }
    }
}
