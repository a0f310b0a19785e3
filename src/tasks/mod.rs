// src/tasks/mod.rs
//! Task store for async script generation. Callers poll a task id while the
//! workflow runs on a background tokio task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub type TaskId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub status: TaskStatus,
    pub result: Option<String>,
    pub error: Option<String>,
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
            file_path: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Concurrency-safe keyed task table. An update committed by one caller is
/// visible to the next read.
pub struct TaskManager {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a fresh pending task and return its id.
    pub async fn create_task(&self) -> TaskId {
        let task = Task::new();
        let task_id = task.id.clone();
        let mut tasks = self.tasks.write().await;
        tasks.insert(task_id.clone(), task);
        tracing::info!("🆕 Created task: {}", task_id);
        task_id
    }

    pub async fn get_task(&self, task_id: &str) -> Option<Task> {
        let tasks = self.tasks.read().await;
        tasks.get(task_id).cloned()
    }

    pub async fn mark_running(&self, task_id: &str) {
        self.update(task_id, |task| {
            task.status = TaskStatus::Running;
        })
        .await;
    }

    pub async fn mark_completed(&self, task_id: &str, result: String, file_path: Option<String>) {
        self.update(task_id, |task| {
            task.status = TaskStatus::Completed;
            task.result = Some(result);
            task.file_path = file_path;
        })
        .await;
    }

    pub async fn mark_failed(&self, task_id: &str, error: String) {
        self.update(task_id, |task| {
            task.status = TaskStatus::Failed;
            task.error = Some(error);
        })
        .await;
    }

    async fn update(&self, task_id: &str, mutate: impl FnOnce(&mut Task)) {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(task) => {
                mutate(task);
                task.updated_at = Utc::now();
                tracing::debug!("📊 Task {} now {:?}", task_id, task.status);
            }
            None => tracing::warn!("Update for unknown task: {}", task_id),
        }
    }

    /// Drop terminal tasks older than `max_age_hours`.
    pub async fn cleanup_old_tasks(&self, max_age_hours: i64) {
        let cutoff = Utc::now() - chrono::Duration::hours(max_age_hours);
        let mut tasks = self.tasks.write().await;

        let to_remove: Vec<TaskId> = tasks
            .iter()
            .filter(|(_, task)| {
                matches!(task.status, TaskStatus::Completed | TaskStatus::Failed)
                    && task.updated_at < cutoff
            })
            .map(|(id, _)| id.clone())
            .collect();

        for task_id in to_remove {
            tasks.remove(&task_id);
            tracing::debug!("🗑️ Cleaned up old task: {}", task_id);
        }
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedTaskManager = Arc<TaskManager>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle_updates_are_visible_to_readers() {
        let manager = TaskManager::new();
        let task_id = manager.create_task().await;

        assert_eq!(manager.get_task(&task_id).await.unwrap().status, TaskStatus::Pending);

        manager.mark_running(&task_id).await;
        assert_eq!(manager.get_task(&task_id).await.unwrap().status, TaskStatus::Running);

        manager
            .mark_completed(&task_id, "Script text".to_string(), Some("outputs/a.md".to_string()))
            .await;
        let task = manager.get_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.as_deref(), Some("Script text"));
        assert_eq!(task.file_path.as_deref(), Some("outputs/a.md"));
        assert!(task.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_task_carries_error_and_no_result() {
        let manager = TaskManager::new();
        let task_id = manager.create_task().await;
        manager.mark_failed(&task_id, "model provider unreachable".to_string()).await;

        let task = manager.get_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("model provider unreachable"));
        assert!(task.result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_task_reads_as_none() {
        let manager = TaskManager::new();
        assert!(manager.get_task("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_old_terminal_tasks() {
        let manager = TaskManager::new();
        let done = manager.create_task().await;
        let pending = manager.create_task().await;
        manager.mark_completed(&done, "x".to_string(), None).await;

        // Nothing is old enough yet
        manager.cleanup_old_tasks(1).await;
        assert!(manager.get_task(&done).await.is_some());

        // Everything terminal is older than a zero-hour horizon
        manager.cleanup_old_tasks(0).await;
        assert!(manager.get_task(&done).await.is_none());
        assert!(manager.get_task(&pending).await.is_some());
    }
}
