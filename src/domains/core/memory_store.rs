use crate::domains::core::document_store::{DocumentStore, Fields, Query, StoredDocument};
use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Get,
    Query,
    Count,
    Add,
    Set,
    Update,
    Delete,
}

/// In-process document store with the same query semantics as the SQLite one.
/// Documents of a collection are kept in insertion order.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
    failures: RwLock<HashSet<(StoreOperation, String)>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `operation` on `collection` fail with `StoreError::Unavailable`.
    pub async fn fail_on(&self, operation: StoreOperation, collection: &str) {
        self.failures
            .write()
            .await
            .insert((operation, collection.to_string()));
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    async fn check(&self, operation: StoreOperation, collection: &str) -> StoreResult<()> {
        if self
            .failures
            .read()
            .await
            .contains(&(operation, collection.to_string()))
        {
            return Err(StoreError::Unavailable(format!(
                "injected {:?} failure on {}",
                operation, collection
            )));
        }
        Ok(())
    }

    /// Number of documents currently held in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        self.check(StoreOperation::Get, collection).await?;
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<StoredDocument>> {
        self.check(StoreOperation::Query, collection).await?;
        let docs = self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();
        Ok(query.apply(docs))
    }

    async fn count(&self, collection: &str, query: &Query) -> StoreResult<usize> {
        self.check(StoreOperation::Count, collection).await?;
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map_or(0, |docs| docs.iter().filter(|d| query.matches(&d.data)).count()))
    }

    async fn add(&self, collection: &str, data: Fields) -> StoreResult<String> {
        self.check(StoreOperation::Add, collection).await?;
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument::new(id.clone(), data));
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()> {
        self.check(StoreOperation::Set, collection).await?;
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.data = data,
            None => docs.push(StoredDocument::new(id, data)),
        }
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()> {
        self.check(StoreOperation::Update, collection).await?;
        let mut guard = self.collections.write().await;
        let existing = guard
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::NotFound(collection.to_string(), id.to_string()))?;
        existing.data.extend(patch);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.check(StoreOperation::Delete, collection).await?;
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }
}
