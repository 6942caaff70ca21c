// ABOUTME: File-backed ScopeRepository — one JSON document per scope

use crate::models::Scope;
use crate::repository::ScopeRepository;
use async_trait::async_trait;
use registry_core::{AppError, AppResult};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct FileScopeRepository {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileScopeRepository {
    pub async fn new(dir: PathBuf) -> AppResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Arc::new(Mutex::new(())),
        })
    }

    fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    async fn read(&self, name: &str) -> AppResult<Option<Scope>> {
        match tokio::fs::read(self.file_for(name)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, scope: &Scope) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(scope)?;
        tokio::fs::write(self.file_for(&scope.name), bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl ScopeRepository for FileScopeRepository {
    async fn load_all(&self) -> AppResult<Vec<Scope>> {
        self.list_all().await
    }

    async fn get(&self, name: &str) -> AppResult<Option<Scope>> {
        self.read(name).await
    }

    async fn list_all(&self) -> AppResult<Vec<Scope>> {
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
        out.sort_by(|a: &Scope, b: &Scope| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn create(&self, scope: Scope) -> AppResult<Scope> {
        let _guard = self.lock.lock().await;
        if self.read(&scope.name).await?.is_some() {
            return Err(AppError::already_exists(format!("scope {}", scope.name)));
        }
        self.write(&scope).await?;
        Ok(scope)
    }

    async fn update(&self, scope: Scope) -> AppResult<Scope> {
        let _guard = self.lock.lock().await;
        if self.read(&scope.name).await?.is_none() {
            return Err(AppError::not_found(format!("scope {}", scope.name)));
        }
        self.write(&scope).await?;
        Ok(scope)
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(self.file_for(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
