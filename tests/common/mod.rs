//! Shared harness: run the router on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rmdn::config::AppConfig;
use rmdn::db::{MemoryTaskStore, StoreError, TaskStore};
use rmdn::models::task::{NewTask, Task};
use rmdn::AppState;
use tokio::net::TcpListener;

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: None,
        database_max_connections: 5,
        host: "127.0.0.1".to_string(),
        port: 0,
        frontend_url: "http://localhost:3000".to_string(),
        body_limit_bytes: 64 * 1024,
    }
}

/// Spin up the full Axum app against `store`, returning the base URL and a
/// handle to stop the server.
pub async fn start_server(store: Arc<dyn TaskStore>) -> (String, tokio::task::JoinHandle<()>) {
    let app = rmdn::routes::router(AppState {
        store,
        config: test_config(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (base_url, handle)
}

/// Memory store that can be switched into failing, or made to answer the
/// next list call late (after reading its rows).
#[derive(Debug, Default)]
pub struct ControlledStore {
    inner: MemoryTaskStore,
    failing: AtomicBool,
    list_delay: Mutex<Option<Duration>>,
}

impl ControlledStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn delay_next_list(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::new("storage unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for ControlledStore {
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        self.check()?;
        let rows = self.inner.list_by_user(user_id).await?;
        let delay = self.list_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(rows)
    }

    async fn upsert(&self, task: &NewTask) -> Result<Vec<Task>, StoreError> {
        self.check()?;
        self.inner.upsert(task).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
