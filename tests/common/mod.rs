//! Common test utilities

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::RwLock;

use legacy_orders::aggregate::OrderStore;
use legacy_orders::broadcast::OrderBroadcaster;
use legacy_orders::hash_store::HashStore;
use legacy_orders::ingest::{IngestPipeline, StagedFile};

/// A fresh, isolated core: aggregate store, hash store and broadcaster,
/// with hash files and staged uploads living under a temp directory.
pub struct TestCore {
    pub store: Arc<RwLock<OrderStore>>,
    pub hashes: Arc<RwLock<HashStore>>,
    pub broadcaster: OrderBroadcaster,
    pub uploads: PathBuf,
    pub file_hashes_path: PathBuf,
    pub line_hashes_path: PathBuf,
    // Dropping this removes every file the test created.
    _dir: TempDir,
}

impl TestCore {
    pub fn pipeline(&self, delete_files: bool) -> IngestPipeline {
        IngestPipeline::new(self.store.clone(), self.hashes.clone(), delete_files)
    }
}

/// Build a fresh core with empty hash sets.
pub async fn setup_core() -> TestCore {
    let dir = TempDir::new().expect("failed to create temp dir");
    let uploads = dir.path().join("uploads");
    tokio::fs::create_dir_all(&uploads)
        .await
        .expect("failed to create uploads dir");

    let file_hashes_path = dir.path().join("fileHashes.json");
    let line_hashes_path = dir.path().join("lineHashes.json");
    let (hash_store, status) =
        HashStore::load(file_hashes_path.clone(), line_hashes_path.clone()).await;
    assert!(!status.is_degraded());

    let broadcaster = OrderBroadcaster::new(30);
    let store = OrderStore::new(broadcaster.clone());

    TestCore {
        store: Arc::new(RwLock::new(store)),
        hashes: Arc::new(RwLock::new(hash_store)),
        broadcaster,
        uploads,
        file_hashes_path,
        line_hashes_path,
        _dir: dir,
    }
}

/// Write `content` under a fresh name in `dir` and return its descriptor.
pub async fn stage_file(dir: &Path, name: &str, content: &str) -> StagedFile {
    let path = dir.join(name);
    tokio::fs::write(&path, content)
        .await
        .expect("failed to write staged file");
    StagedFile {
        path,
        filename: name.to_string(),
    }
}

/// Render one fixed-width legacy record line.
pub fn make_line(
    user_id: i64,
    user_name: &str,
    order_id: i64,
    product_id: i64,
    value: &str,
    date: &str,
) -> String {
    format!(
        "{:0>10}{:>45}{:0>10}{:0>10}{:>12}{}",
        user_id, user_name, order_id, product_id, value, date
    )
}

#[test]
fn test_make_line_matches_record_width() {
    let line = make_line(85, "Jama Block", 906, 4, "293.47", "20210618");
    assert_eq!(line.len(), 95);
    assert_eq!(
        line,
        "0000000085                                   Jama Block00000009060000000004      293.4720210618"
    );
}
