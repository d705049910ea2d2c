//! In-process task store used when no database is configured, and in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreError, TaskStore};
use crate::models::task::{NewTask, Task};

#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    inner: RwLock<MemoryTables>,
}

#[derive(Debug, Default)]
struct MemoryTables {
    rows: BTreeMap<i64, Task>,
    last_id: i64,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .rows
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert(&self, task: &NewTask) -> Result<Vec<Task>, StoreError> {
        let mut tables = self.inner.write().await;

        if let Some(existing) = task.id.and_then(|id| tables.rows.get(&id)) {
            let mut updated = existing.clone();
            updated.task_type = task.task_type.clone();
            updated.content = task.content.clone();
            updated.day = task.day;
            if let Some(progress) = task.progress {
                updated.progress = progress;
            }
            tables.rows.insert(updated.id, updated.clone());
            return Ok(vec![updated]);
        }

        // The id counter only moves forward, so deleted ids are never handed out again.
        let id = task.id.unwrap_or(tables.last_id + 1);
        tables.last_id = tables.last_id.max(id);

        let row = Task {
            id,
            user_id: task.user_id.clone(),
            task_type: task.task_type.clone(),
            content: task.content.clone(),
            day: task.day,
            progress: task.progress.unwrap_or(0),
            created_at: Utc::now(),
        };
        tables.rows.insert(id, row.clone());
        Ok(vec![row])
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner.write().await.rows.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(user_id: &str, day: i32) -> NewTask {
        NewTask {
            id: None,
            user_id: user_id.to_string(),
            task_type: "todo".to_string(),
            content: "read".to_string(),
            day,
            progress: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryTaskStore::new();
        let a = store.upsert(&new_task("u1", 1)).await.unwrap();
        let b = store.upsert(&new_task("u1", 2)).await.unwrap();
        assert!(b[0].id > a[0].id);
        assert_eq!(a[0].progress, 0);
    }

    #[tokio::test]
    async fn list_filters_by_user_in_id_order() {
        let store = MemoryTaskStore::new();
        store.upsert(&new_task("u1", 3)).await.unwrap();
        store.upsert(&new_task("u2", 4)).await.unwrap();
        store.upsert(&new_task("u1", 1)).await.unwrap();

        let rows = store.list_by_user("u1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].id < rows[1].id);
        assert!(rows.iter().all(|t| t.user_id == "u1"));
    }

    #[tokio::test]
    async fn update_keeps_owner_and_progress_when_absent() {
        let store = MemoryTaskStore::new();
        let mut task = new_task("u1", 5);
        task.progress = Some(50);
        let created = store.upsert(&task).await.unwrap().remove(0);

        let update = NewTask {
            id: Some(created.id),
            user_id: "someone-else".to_string(),
            content: "read more".to_string(),
            progress: None,
            ..new_task("u1", 5)
        };
        let updated = store.upsert(&update).await.unwrap().remove(0);

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, "u1");
        assert_eq!(updated.content, "read more");
        assert_eq!(updated.progress, 50);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn explicit_unknown_id_inserts_and_is_not_reused() {
        let store = MemoryTaskStore::new();
        let mut task = new_task("u1", 1);
        task.id = Some(1);
        store.upsert(&task).await.unwrap();

        let fresh = store.upsert(&new_task("u1", 2)).await.unwrap().remove(0);
        assert_eq!(fresh.id, 2);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused_after_updates() {
        let store = MemoryTaskStore::new();
        let mut ids = Vec::new();
        for day in 1..=3 {
            ids.push(store.upsert(&new_task("u1", day)).await.unwrap()[0].id);
        }
        store.delete(ids[2]).await.unwrap();

        let update = NewTask {
            id: Some(ids[0]),
            ..new_task("u1", 1)
        };
        store.upsert(&update).await.unwrap();

        let fresh = store.upsert(&new_task("u2", 1)).await.unwrap().remove(0);
        assert!(fresh.id > ids[2]);
    }

    #[tokio::test]
    async fn explicit_high_id_moves_the_counter_forward() {
        let store = MemoryTaskStore::new();
        let mut task = new_task("u1", 1);
        task.id = Some(100);
        store.upsert(&task).await.unwrap();
        store.delete(100).await.unwrap();

        let fresh = store.upsert(&new_task("u1", 2)).await.unwrap().remove(0);
        assert_eq!(fresh.id, 101);
    }

    #[tokio::test]
    async fn delete_missing_id_is_ok() {
        let store = MemoryTaskStore::new();
        assert!(store.delete(42).await.is_ok());
        assert!(store.is_empty().await);
    }
}
