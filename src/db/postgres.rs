//! PostgreSQL-backed task store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreError, TaskStore};
use crate::models::task::{NewTask, Task};

/// Upsert result plus whether the row was freshly inserted.
#[derive(sqlx::FromRow)]
struct UpsertedRow {
    #[sqlx(flatten)]
    task: Task,
    inserted: bool,
}

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explicit ids bypass the identity sequence. Move it forward past `id`
    /// so generated ids never collide with it; never move it backwards.
    async fn advance_sequence(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            SELECT setval(seq, $1)
            FROM (SELECT pg_get_serial_sequence('tasks', 'id')::regclass AS seq) s
            WHERE $1 > COALESCE(pg_sequence_last_value(seq), 0)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, Task>(
            "SELECT id, user_id, type, content, day, progress, created_at
             FROM tasks WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert(&self, task: &NewTask) -> Result<Vec<Task>, StoreError> {
        let row = match task.id {
            Some(id) => {
                let row = sqlx::query_as::<_, UpsertedRow>(
                    r#"
                    INSERT INTO tasks (id, user_id, type, content, day, progress)
                    VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0))
                    ON CONFLICT (id) DO UPDATE SET
                        type = EXCLUDED.type,
                        content = EXCLUDED.content,
                        day = EXCLUDED.day,
                        progress = COALESCE($6, tasks.progress)
                    RETURNING id, user_id, type, content, day, progress, created_at,
                              (xmax = 0) AS inserted
                    "#,
                )
                .bind(id)
                .bind(&task.user_id)
                .bind(&task.task_type)
                .bind(&task.content)
                .bind(task.day)
                .bind(task.progress)
                .fetch_one(&self.pool)
                .await?;

                if row.inserted {
                    self.advance_sequence(id).await?;
                }
                row.task
            }
            None => {
                sqlx::query_as::<_, Task>(
                    r#"
                    INSERT INTO tasks (user_id, type, content, day, progress)
                    VALUES ($1, $2, $3, $4, COALESCE($5, 0))
                    RETURNING id, user_id, type, content, day, progress, created_at
                    "#,
                )
                .bind(&task.user_id)
                .bind(&task.task_type)
                .bind(&task.content)
                .bind(task.day)
                .bind(task.progress)
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(vec![row])
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!(id, rows = result.rows_affected(), "Deleted task");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
