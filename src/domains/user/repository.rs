use crate::domains::core::document_store::{Direction, DocumentStore, Query};
use crate::domains::core::repository::{Collection, FindById};
use crate::domains::user::types::{User, UserDocument, UserFilter, UserPatch, UserStatusPatch};
use crate::errors::DomainResult;
use crate::types::RecordStatus;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync + FindById<User> {
    /// Profiles matching the role/status equality filters, ordered by name.
    async fn find_all(&self, filter: &UserFilter) -> DomainResult<Vec<User>>;

    /// Profile of an identity-provider account: the document whose `uid`
    /// field matches, else a document keyed by the uid itself.
    async fn find_by_uid(&self, uid: &str) -> DomainResult<Option<User>>;

    async fn create(&self, document: &UserDocument) -> DomainResult<User>;

    async fn update(&self, id: &str, patch: &UserPatch) -> DomainResult<User>;

    async fn set_status(&self, id: &str, status: RecordStatus) -> DomainResult<()>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}

/// Document-store implementation of UserRepository
pub struct StoreUserRepository {
    users: Collection<UserDocument>,
}

impl StoreUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Collection::new(store, "User"),
        }
    }
}

#[async_trait]
impl FindById<User> for StoreUserRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<User> {
        self.users.get(id).await
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn find_all(&self, filter: &UserFilter) -> DomainResult<Vec<User>> {
        let mut query = Query::new();
        if let Some(role) = filter.role {
            query = query.where_eq("role", role.as_str());
        }
        if let Some(status) = filter.status {
            query = query.where_eq("status", status.as_str());
        }
        self.users.list(&query.order_by("name", Direction::Asc)).await
    }

    async fn find_by_uid(&self, uid: &str) -> DomainResult<Option<User>> {
        let by_field = self
            .users
            .list(&Query::new().where_eq("uid", uid).limit(1))
            .await?;
        if let Some(user) = by_field.into_iter().next() {
            return Ok(Some(user));
        }
        self.users.find(uid).await
    }

    async fn create(&self, document: &UserDocument) -> DomainResult<User> {
        let id = self.users.insert(document).await?;
        self.users.get(&id).await
    }

    async fn update(&self, id: &str, patch: &UserPatch) -> DomainResult<User> {
        self.users.patch(id, patch).await?;
        self.users.get(id).await
    }

    async fn set_status(&self, id: &str, status: RecordStatus) -> DomainResult<()> {
        let patch = UserStatusPatch {
            status,
            updated_at: Utc::now(),
        };
        self.users.patch(id, &patch).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.users.remove(id).await
    }
}
