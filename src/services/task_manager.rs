// ABOUTME: Background task manager — tracked task creation, failure logging, cooperative shutdown
// ABOUTME: Every background subsystem (health monitor, federation sync, index warmup) spawns through this

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct TrackedTask {
    name: String,
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Owns every live background task for this process, tagged with a name
///. Cancellation is cooperative: work
/// closures receive a [`CancellationToken`] and must check it at suspension
/// points; the manager never force-kills a task.
#[derive(Clone)]
pub struct TaskManager {
    tasks: Arc<DashMap<u64, TrackedTask>>,
    next_id: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn and track `work`, tagged with `name`. Returns `None` once the
    /// manager has been closed by [`Self::shutdown`] — no task is started
    /// after shutdown.
    pub fn create_task<F, Fut>(&self, name: impl Into<String>, work: F) -> Option<()>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            tracing::warn!(name = %name.into(), "rejected task submission after shutdown");
            return None;
        }

        let name = name.into();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let cancel = CancellationToken::new();
        let tasks = self.tasks.clone();
        let task_name = name.clone();
        let child_token = cancel.clone();

        let handle = tokio::spawn(async move {
            work(child_token).await;
            tasks.remove(&id);
        });

        self.tasks.insert(
            id,
            TrackedTask {
                name: task_name,
                handle,
                cancel,
            },
        );
        Some(())
    }

    /// Spawn and track a fallible `work` closure; a terminal `Err` is logged
    /// with the task's name, never propagated to the caller.
    pub fn create_fallible_task<F, Fut>(&self, name: impl Into<String>, work: F) -> Option<()>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = registry_core::AppResult<()>> + Send + 'static,
    {
        let name = name.into();
        let log_name = name.clone();
        self.create_task(name, move |token| async move {
            if let Err(e) = work(token).await {
                tracing::error!(task = %log_name, error = %e, "background task failed");
            }
        })
    }

    /// Current count of tracked (not-yet-completed) tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Names of every currently tracked task, for observability.
    #[must_use]
    pub fn task_names(&self) -> Vec<String> {
        self.tasks.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Cancel every tracked task whose name equals `name` (e.g. a per-entity
    /// health probe that should stop early).
    pub fn cancel_by_name(&self, name: &str) {
        for entry in self.tasks.iter() {
            if entry.name == name {
                entry.cancel.cancel();
            }
        }
    }

    /// Mark the manager closed (rejecting new submissions), cancel every
    /// tracked task, and wait up to `timeout` for them to finish.
    pub async fn shutdown(&self, timeout: Duration) {
        self.closed.store(true, Ordering::SeqCst);

        let entries: Vec<(u64, CancellationToken)> =
            self.tasks.iter().map(|e| (*e.key(), e.cancel.clone())).collect();
        for (_, cancel) in &entries {
            cancel.cancel();
        }

        let deadline = tokio::time::Instant::now() + timeout;
        for (id, _) in entries {
            let Some((_, task)) = self.tasks.remove(&id) else {
                continue;
            };
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, task.handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(task = %task.name, error = %e, "task panicked during shutdown"),
                Err(_) => tracing::warn!(task = %task.name, "task did not finish within shutdown timeout"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn tracks_and_clears_completed_tasks() {
        let manager = TaskManager::new();
        manager.create_task("probe", |_| async {});
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(manager.task_count(), 0);
    }

    #[tokio::test]
    async fn shutdown_cancels_cooperative_tasks() {
        let manager = TaskManager::new();
        let ran = Arc::new(AtomicU32::new(0));
        let ran_clone = ran.clone();
        manager.create_task("long-poll", move |token| async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(Duration::from_secs(60)) => {}
            }
            ran_clone.fetch_add(1, Ordering::SeqCst);
        });
        manager.shutdown(Duration::from_secs(2)).await;
        assert_eq!(manager.task_count(), 0);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_tasks_after_shutdown() {
        let manager = TaskManager::new();
        manager.shutdown(Duration::from_secs(1)).await;
        let result = manager.create_task("late", |_| async {});
        assert!(result.is_none());
        assert_eq!(manager.task_count(), 0);
    }
}
