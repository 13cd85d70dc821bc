#![cfg(test)]
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Migrations run once per test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_config(max_connections: u32) -> DatabaseConfig {
    let mut cfg = configs::load_default().map(|c| c.database).unwrap_or_default();
    cfg.normalize_from_env();
    cfg.max_connections = cfg.max_connections.max(max_connections);
    cfg.min_connections = 1;
    cfg.connect_timeout_secs = cfg.connect_timeout_secs.max(10);
    cfg.acquire_timeout_secs = cfg.acquire_timeout_secs.max(10);
    cfg.idle_timeout_secs = cfg.idle_timeout_secs.max(60);
    cfg.max_lifetime_secs = cfg.max_lifetime_secs.max(600);
    cfg
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    MIGRATED
        .get_or_init(|| async {
            let db = connect_with_config(&test_config(10)).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            drop(db);
        })
        .await;

    // Fresh connection for the current test's runtime
    let db = connect_with_config(&test_config(20)).await?;
    Ok(db)
}
