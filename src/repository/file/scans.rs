// ABOUTME: File-backed SecurityScanRepository — append-only per-entity scan history

use crate::models::SecurityScanResult;
use crate::repository::SecurityScanRepository;
use async_trait::async_trait;
use registry_core::AppResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct FileSecurityScanRepository {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileSecurityScanRepository {
    pub async fn new(dir: PathBuf) -> AppResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Arc::new(Mutex::new(())),
        })
    }

    fn file_for(&self, entity_path: &str) -> PathBuf {
        let mangled = entity_path.trim_start_matches('/').replace('/', "_");
        self.dir.join(format!("{mangled}.json"))
    }

    async fn read_history(&self, entity_path: &str) -> AppResult<Vec<SecurityScanResult>> {
        match tokio::fs::read(self.file_for(entity_path)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SecurityScanRepository for FileSecurityScanRepository {
    async fn append(&self, result: SecurityScanResult) -> AppResult<SecurityScanResult> {
        let _guard = self.lock.lock().await;
        let mut history = self.read_history(&result.entity_path).await?;
        history.push(result.clone());
        let bytes = serde_json::to_vec_pretty(&history)?;
        tokio::fs::write(self.file_for(&result.entity_path), bytes).await?;
        Ok(result)
    }

    async fn current(&self, entity_path: &str) -> AppResult<Option<SecurityScanResult>> {
        let history = self.history(entity_path).await?;
        Ok(history.into_iter().max_by_key(|r| r.scanned_at))
    }

    async fn history(&self, entity_path: &str) -> AppResult<Vec<SecurityScanResult>> {
        let _guard = self.lock.lock().await;
        self.read_history(entity_path).await
    }
}
