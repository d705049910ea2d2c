//! Seed script for development: populates a fresh database with sample tasks
//! and prints an ID token for the seeded user.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` and `IDENTITY_SECRET` environment variables (reads .env).
//! `SEED_USER_ID` overrides the seeded user (default `dev-user`).

use rmdn::db::{self, PgTaskStore, TaskStore};
use rmdn::models::principal::Principal;
use rmdn::models::task::{Category, NewTask};
use rmdn::services::auth;

const DEFAULT_USER_ID: &str = "dev-user";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")?;
    let secret = std::env::var("IDENTITY_SECRET")?;
    let user_id = std::env::var("SEED_USER_ID").unwrap_or_else(|_| DEFAULT_USER_ID.to_string());

    let pool = db::create_pool(&db_url, 5).await?;
    db::run_migrations(&pool).await?;
    let store = PgTaskStore::new(pool);

    println!("=== RMDN Seed Script ===");

    seed_tasks(&store, &user_id).await?;

    let principal = Principal {
        uid: user_id.clone(),
        display_name: Some("Dev User".to_string()),
        email: None,
    };
    let token = auth::issue_id_token(&principal, &secret, auth::DEFAULT_TOKEN_TTL_SECS)?;

    println!("\n=== Seed complete! ===");
    println!("RMDN_ID_TOKEN={token}");

    Ok(())
}

async fn seed_tasks(store: &PgTaskStore, user_id: &str) -> anyhow::Result<()> {
    if !store.list_by_user(user_id).await?.is_empty() {
        println!("[skip] Tasks already exist for {user_id}");
        return Ok(());
    }

    let samples = [
        (Category::Todo, "Tarawih at the mosque", 1, 100),
        (Category::Hapalan, "Al-Mulk 1-10", 1, 100),
        (Category::Planner, "Plan iftar menu", 2, 50),
        (Category::Todo, "Read one juz", 2, 0),
        (Category::Chat, "Call family", 3, 0),
    ];

    for (category, content, day, progress) in samples {
        store
            .upsert(&NewTask {
                id: None,
                user_id: user_id.to_string(),
                task_type: category.as_str().to_string(),
                content: content.to_string(),
                day,
                progress: Some(progress),
            })
            .await?;
    }

    println!("[done] Created {} tasks for {user_id}", samples.len());
    Ok(())
}
