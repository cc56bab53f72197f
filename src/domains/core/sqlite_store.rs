use crate::db_migration;
use crate::domains::core::document_store::{DocumentStore, Fields, Query, StoredDocument};
use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query, query_as, query_scalar, FromRow, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

/// Row of the `documents` table
#[derive(Debug, Clone, FromRow)]
struct DocumentRow {
    id: String,
    collection: String,
    data: String,
}

impl DocumentRow {
    fn into_document(self) -> StoreResult<StoredDocument> {
        match serde_json::from_str::<Value>(&self.data) {
            Ok(Value::Object(map)) => Ok(StoredDocument::new(self.id, map)),
            Ok(_) => Err(StoreError::decode(&self.collection, &self.id, "document is not an object")),
            Err(e) => Err(StoreError::decode(&self.collection, &self.id, e)),
        }
    }
}

/// Document store persisted as JSON rows in SQLite.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `database_url` and applies migrations.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        db_migration::initialize_database(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_collection(&self, collection: &str) -> StoreResult<Vec<StoredDocument>> {
        let rows = query_as::<_, DocumentRow>(
            "SELECT id, collection, data FROM documents WHERE collection = ? ORDER BY created_at, rowid",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        let row = query_as::<_, DocumentRow>(
            "SELECT id, collection, data FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<StoredDocument>> {
        debug!("Querying {} with {} filter(s)", collection, query.filters.len());
        let documents = self.load_collection(collection).await?;
        Ok(query.apply(documents))
    }

    async fn count(&self, collection: &str, query: &Query) -> StoreResult<usize> {
        if query.filters.is_empty() {
            let total: i64 = query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
                .bind(collection)
                .fetch_one(&self.pool)
                .await?;
            return Ok(total.max(0) as usize);
        }
        let documents = self.load_collection(collection).await?;
        Ok(documents.iter().filter(|d| query.matches(&d.data)).count())
    }

    async fn add(&self, collection: &str, data: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now().to_rfc3339();
        let body = serde_json::to_string(&data)?;

        query("INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
            .bind(collection)
            .bind(&id)
            .bind(body)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let body = serde_json::to_string(&data)?;

        query(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        )
        .bind(collection)
        .bind(id)
        .bind(body)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = query_as::<_, DocumentRow>(
            "SELECT id, collection, data FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(collection.to_string(), id.to_string()))?;

        let mut document = row.into_document()?;
        document.data.extend(patch);
        let body = serde_json::to_string(&document.data)?;

        query("UPDATE documents SET data = ?, updated_at = ? WHERE collection = ? AND id = ?")
            .bind(body)
            .bind(Utc::now().to_rfc3339())
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
