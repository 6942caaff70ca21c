// ABOUTME: File-backed ServerRepository — one JSON document per server plus a state file

use super::paths::server_path;
use crate::models::{EnabledState, RatingEntry, Server};
use crate::repository::ServerRepository;
use async_trait::async_trait;
use registry_core::AppError;
use registry_core::AppResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct FileServerRepository {
    dir: PathBuf,
    state_path: PathBuf,
    /// Serializes writes to the directory and the state file; the file
    /// backend itself is explicitly non-transactional, but concurrent
    /// writers inside one process must not interleave a read-modify-write.
    lock: Arc<Mutex<()>>,
}

impl FileServerRepository {
    pub async fn new(dir: PathBuf) -> AppResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        let state_path = dir.join("server_state.json");
        Ok(Self {
            dir,
            state_path,
            lock: Arc::new(Mutex::new(())),
        })
    }

    async fn read_state(&self) -> AppResult<EnabledState> {
        match tokio::fs::read(&self.state_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EnabledState::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_state(&self, state: &EnabledState) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(&self.state_path, bytes).await?;
        Ok(())
    }

    async fn read_entity(&self, path: &str) -> AppResult<Option<Server>> {
        let file = server_path(&self.dir, path);
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entity(&self, server: &Server) -> AppResult<()> {
        let file = server_path(&self.dir, &server.path);
        let bytes = serde_json::to_vec_pretty(server)?;
        tokio::fs::write(&file, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl ServerRepository for FileServerRepository {
    async fn load_all(&self) -> AppResult<Vec<Server>> {
        self.list_all().await
    }

    async fn get(&self, path: &str) -> AppResult<Option<Server>> {
        let mut server = match self.read_entity(path).await? {
            Some(s) => s,
            None => return Ok(None),
        };
        let state = self.read_state().await?;
        server.is_enabled = state.is_enabled(&server.path);
        Ok(Some(server))
    }

    async fn list_all(&self) -> AppResult<Vec<Server>> {
        let _guard = self.lock.lock().await;
        let state = self.read_state().await?;
        let mut out = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            if name == "server_state.json" || !name.ends_with(".json") {
                continue;
            }
            let bytes = tokio::fs::read(entry.path()).await?;
            let mut server: Server = serde_json::from_slice(&bytes)?;
            server.is_enabled = state.is_enabled(&server.path);
            out.push(server);
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    async fn create(&self, mut server: Server) -> AppResult<Server> {
        let _guard = self.lock.lock().await;
        if self.read_entity(&server.path).await?.is_some() {
            return Err(AppError::already_exists(format!("server {}", server.path)));
        }
        let now = chrono::Utc::now();
        server.registered_at = now;
        server.updated_at = now;
        self.write_entity(&server).await?;
        let mut state = self.read_state().await?;
        state.set_enabled(&server.path, server.is_enabled);
        self.write_state(&state).await?;
        Ok(server)
    }

    async fn update(&self, mut server: Server) -> AppResult<Server> {
        let _guard = self.lock.lock().await;
        if self.read_entity(&server.path).await?.is_none() {
            return Err(AppError::not_found(format!("server {}", server.path)));
        }
        server.updated_at = chrono::Utc::now();
        self.write_entity(&server).await?;
        Ok(server)
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let file = server_path(&self.dir, path);
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                let mut state = self.read_state().await?;
                let normalized = path.trim_end_matches('/').to_string();
                state.enabled.retain(|p| p.trim_end_matches('/') != normalized);
                state.disabled.retain(|p| p.trim_end_matches('/') != normalized);
                self.write_state(&state).await?;
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_state(&self) -> AppResult<EnabledState> {
        self.read_state().await
    }

    async fn set_enabled(&self, path: &str, enabled: bool) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        if self.read_entity(path).await?.is_none() {
            return Err(AppError::not_found(format!("server {path}")));
        }
        let mut state = self.read_state().await?;
        state.set_enabled(path, enabled);
        self.write_state(&state).await
    }

    async fn rate(&self, path: &str, username: &str, rating: u8) -> AppResult<Server> {
        let _guard = self.lock.lock().await;
        let mut server = self
            .read_entity(path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("server {path}")))?;

        if let Some(existing) = server.rating_details.iter_mut().find(|r| r.username == username) {
            existing.rating = rating;
        } else {
            server.rating_details.push(RatingEntry {
                username: username.to_string(),
                rating,
            });
        }
        server.updated_at = chrono::Utc::now();
        self.write_entity(&server).await?;
        let state = self.read_state().await?;
        server.is_enabled = state.is_enabled(&server.path);
        Ok(server)
    }
}
