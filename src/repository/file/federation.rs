// ABOUTME: File-backed FederationConfigRepository — one JSON document per upstream

use crate::models::FederationConfig;
use crate::repository::FederationConfigRepository;
use async_trait::async_trait;
use registry_core::{AppError, AppResult};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct FileFederationConfigRepository {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileFederationConfigRepository {
    pub async fn new(dir: PathBuf) -> AppResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Arc::new(Mutex::new(())),
        })
    }

    fn file_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn read(&self, id: &str) -> AppResult<Option<FederationConfig>> {
        match tokio::fs::read(self.file_for(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, config: &FederationConfig) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(config)?;
        tokio::fs::write(self.file_for(&config.id), bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl FederationConfigRepository for FileFederationConfigRepository {
    async fn load_all(&self) -> AppResult<Vec<FederationConfig>> {
        self.list_all().await
    }

    async fn get(&self, id: &str) -> AppResult<Option<FederationConfig>> {
        self.read(id).await
    }

    async fn list_all(&self) -> AppResult<Vec<FederationConfig>> {
        let _guard = self.lock.lock().await;
        let mut out = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            if !name.ends_with(".json") {
                continue;
            }
            let bytes = tokio::fs::read(entry.path()).await?;
            out.push(serde_json::from_slice(&bytes)?);
        }
        out.sort_by(|a: &FederationConfig, b: &FederationConfig| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn create(&self, config: FederationConfig) -> AppResult<FederationConfig> {
        let _guard = self.lock.lock().await;
        if self.read(&config.id).await?.is_some() {
            return Err(AppError::already_exists(format!("federation config {}", config.id)));
        }
        self.write(&config).await?;
        Ok(config)
    }

    async fn update(&self, config: FederationConfig) -> AppResult<FederationConfig> {
        let _guard = self.lock.lock().await;
        if self.read(&config.id).await?.is_none() {
            return Err(AppError::not_found(format!("federation config {}", config.id)));
        }
        self.write(&config).await?;
        Ok(config)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(self.file_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
