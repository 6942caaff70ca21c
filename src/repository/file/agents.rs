// ABOUTME: File-backed AgentRepository — one JSON document per agent plus a state file

use super::paths::agent_path;
use crate::models::{Agent, EnabledState, RatingEntry};
use crate::repository::AgentRepository;
use async_trait::async_trait;
use registry_core::AppError;
use registry_core::AppResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct FileAgentRepository {
    dir: PathBuf,
    state_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileAgentRepository {
    pub async fn new(dir: PathBuf) -> AppResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        let state_path = dir.join("agent_state.json");
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

    async fn read_entity(&self, path: &str) -> AppResult<Option<Agent>> {
        let file = agent_path(&self.dir, path);
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entity(&self, agent: &Agent) -> AppResult<()> {
        let file = agent_path(&self.dir, &agent.path);
        let bytes = serde_json::to_vec_pretty(agent)?;
        tokio::fs::write(&file, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl AgentRepository for FileAgentRepository {
    async fn load_all(&self) -> AppResult<Vec<Agent>> {
        self.list_all().await
    }

    async fn get(&self, path: &str) -> AppResult<Option<Agent>> {
        let mut agent = match self.read_entity(path).await? {
            Some(a) => a,
            None => return Ok(None),
        };
        let state = self.read_state().await?;
        agent.is_enabled = state.is_enabled(&agent.path);
        Ok(Some(agent))
    }

    async fn list_all(&self) -> AppResult<Vec<Agent>> {
        let _guard = self.lock.lock().await;
        let state = self.read_state().await?;
        let mut out = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            if name == "agent_state.json" || !name.ends_with("_agent.json") {
                continue;
            }
            let bytes = tokio::fs::read(entry.path()).await?;
            let mut agent: Agent = serde_json::from_slice(&bytes)?;
            agent.is_enabled = state.is_enabled(&agent.path);
            out.push(agent);
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    async fn create(&self, mut agent: Agent) -> AppResult<Agent> {
        let _guard = self.lock.lock().await;
        if self.read_entity(&agent.path).await?.is_some() {
            return Err(AppError::already_exists(format!("agent {}", agent.path)));
        }
        let now = chrono::Utc::now();
        agent.registered_at = now;
        agent.updated_at = now;
        self.write_entity(&agent).await?;
        let mut state = self.read_state().await?;
        state.set_enabled(&agent.path, agent.is_enabled);
        self.write_state(&state).await?;
        Ok(agent)
    }

    async fn update(&self, mut agent: Agent) -> AppResult<Agent> {
        let _guard = self.lock.lock().await;
        if self.read_entity(&agent.path).await?.is_none() {
            return Err(AppError::not_found(format!("agent {}", agent.path)));
        }
        agent.updated_at = chrono::Utc::now();
        self.write_entity(&agent).await?;
        Ok(agent)
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let file = agent_path(&self.dir, path);
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
            return Err(AppError::not_found(format!("agent {path}")));
        }
        let mut state = self.read_state().await?;
        state.set_enabled(path, enabled);
        self.write_state(&state).await
    }

    async fn rate(&self, path: &str, username: &str, rating: u8) -> AppResult<Agent> {
        let _guard = self.lock.lock().await;
        let mut agent = self
            .read_entity(path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("agent {path}")))?;

        if let Some(existing) = agent.rating_details.iter_mut().find(|r| r.username == username) {
            existing.rating = rating;
        } else {
            agent.rating_details.push(RatingEntry {
                username: username.to_string(),
                rating,
            });
        }
        agent.updated_at = chrono::Utc::now();
        self.write_entity(&agent).await?;
        let state = self.read_state().await?;
        agent.is_enabled = state.is_enabled(&agent.path);
        Ok(agent)
    }
}
