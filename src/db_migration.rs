use crate::errors::{StoreError, StoreResult};
use log::{debug, info};
use sqlx::SqlitePool;

// Embed all migration SQL files at compile time
const MIGRATION_DOCUMENTS: &str = include_str!("../migrations/20250601000000_documents.sql");

// List of migrations with their names and SQL content
const MIGRATIONS: &[(&str, &str)] = &[("20250601000000_documents.sql", MIGRATION_DOCUMENTS)];

/// Bring the database schema up to date.
pub async fn initialize_database(pool: &SqlitePool) -> StoreResult<()> {
    create_migrations_table(pool).await?;

    let last_migration = get_last_migration(pool).await?;
    match &last_migration {
        Some(name) => debug!("Last applied migration: {}", name),
        None => debug!("No migrations applied yet"),
    }

    apply_pending_migrations(pool, last_migration).await
}

/// Create migrations table if it doesn't exist
async fn create_migrations_table(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| StoreError::Migration(format!("Failed to create migrations table: {}", e)))?;

    Ok(())
}

/// Get the last applied migration
async fn get_last_migration(pool: &SqlitePool) -> StoreResult<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT name FROM migrations ORDER BY id DESC LIMIT 1")
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::Migration(format!("Failed to get last migration: {}", e)))
}

async fn apply_pending_migrations(
    pool: &SqlitePool,
    last_migration: Option<String>,
) -> StoreResult<()> {
    let pending_migrations = get_pending_migrations(last_migration.as_deref());
    if pending_migrations.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    for (migration_name, migration_sql) in pending_migrations {
        sqlx::raw_sql(migration_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StoreError::Migration(format!("Failed to apply migration {}: {}", migration_name, e))
            })?;

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO migrations (name, applied_at) VALUES (?, ?)")
            .bind(migration_name)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StoreError::Migration(format!("Failed to record migration {}: {}", migration_name, e))
            })?;

        info!("Applied migration {}", migration_name);
    }

    tx.commit().await?;
    Ok(())
}

/// Migrations listed after the last applied one, or all of them on a fresh database.
fn get_pending_migrations(last_migration: Option<&str>) -> Vec<(&'static str, &'static str)> {
    let mut pending = Vec::new();
    let mut should_include = last_migration.is_none();

    for &(migration_name, migration_sql) in MIGRATIONS {
        if should_include {
            pending.push((migration_name, migration_sql));
        } else if Some(migration_name) == last_migration {
            should_include = true;
        }
    }

    pending
}
