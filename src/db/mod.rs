//! Database connection pool, migrations, and the task storage seam.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::task::{NewTask, Task};

pub use memory::MemoryTaskStore;
pub use postgres::PgTaskStore;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Failure reported by a storage backend. The message is passed through to
/// API clients as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db_err) => Self::new(db_err.message()),
            other => Self::new(other.to_string()),
        }
    }
}

/// Table operations over the `tasks` collection.
///
/// Upsert is keyed on `id`: a row with the given id is updated in place
/// (keeping `user_id`, and keeping `progress` when none is supplied), an
/// unknown id inserts a row with that id, and no id inserts with a fresh one.
#[async_trait]
pub trait TaskStore: Send + Sync + std::fmt::Debug {
    /// All tasks owned by `user_id`, ordered by id ascending.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Task>, StoreError>;

    async fn upsert(&self, task: &NewTask) -> Result<Vec<Task>, StoreError>;

    /// Delete by id. Deleting an id that does not exist is not an error.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}
