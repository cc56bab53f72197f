use crate::domains::core::document_store::{
    decode, decode_all, encode, DocumentStore, EntityDocument, Fields, Query,
};
use crate::errors::{DomainError, DomainResult};
use async_trait::async_trait;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// Trait for finding entities by ID
#[async_trait]
pub trait FindById<T> {
    /// Find an entity by ID; a missing id is `DomainError::EntityNotFound`.
    async fn find_by_id(&self, id: &str) -> DomainResult<T>;
}

/// Typed access to one collection, shared by the entity repositories.
pub struct Collection<D: EntityDocument> {
    store: Arc<dyn DocumentStore>,
    entity_name: &'static str,
    _document: PhantomData<fn() -> D>,
}

impl<D: EntityDocument> Clone for Collection<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            entity_name: self.entity_name,
            _document: PhantomData,
        }
    }
}

impl<D: EntityDocument> Collection<D> {
    pub fn new(store: Arc<dyn DocumentStore>, entity_name: &'static str) -> Self {
        Self {
            store,
            entity_name,
            _document: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        D::COLLECTION
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn find(&self, id: &str) -> DomainResult<Option<D::Entity>> {
        match self.store.get(D::COLLECTION, id).await? {
            Some(document) => Ok(Some(decode::<D>(document)?)),
            None => Ok(None),
        }
    }

    pub async fn get(&self, id: &str) -> DomainResult<D::Entity> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::EntityNotFound(self.entity_name.to_string(), id.to_string()))
    }

    pub async fn list(&self, query: &Query) -> DomainResult<Vec<D::Entity>> {
        let documents = self.store.query(D::COLLECTION, query).await?;
        Ok(decode_all::<D>(documents)?)
    }

    pub async fn count(&self, query: &Query) -> DomainResult<usize> {
        Ok(self.store.count(D::COLLECTION, query).await?)
    }

    /// Stores a new document and returns its generated id.
    pub async fn insert(&self, document: &D) -> DomainResult<String> {
        let fields = encode(document)?;
        Ok(self.store.add(D::COLLECTION, fields).await?)
    }

    /// Merges a partial document. Unknown ids surface as `EntityNotFound`.
    pub async fn patch<P: Serialize + Sync>(&self, id: &str, patch: &P) -> DomainResult<()> {
        let fields: Fields = encode(patch)?;
        self.store
            .update(D::COLLECTION, id, fields)
            .await
            .map_err(|e| match e {
                crate::errors::StoreError::NotFound(_, _) => {
                    DomainError::EntityNotFound(self.entity_name.to_string(), id.to_string())
                }
                other => DomainError::Store(other),
            })
    }

    pub async fn remove(&self, id: &str) -> DomainResult<()> {
        Ok(self.store.delete(D::COLLECTION, id).await?)
    }
}
