pub mod document_store;
pub mod memory_store;
pub mod object_storage;
pub mod repository;
pub mod search;
pub mod sqlite_store;
pub mod view_scope;
pub mod workflow;

pub use document_store::{collections, Direction, DocumentStore, EntityDocument, Fields, Filter, Query, StoredDocument};
pub use memory_store::{MemoryDocumentStore, StoreOperation};
pub use object_storage::{LocalObjectStorage, ObjectStorage, ObjectStorageError, ObjectStorageResult, StoredObject};
pub use repository::{Collection, FindById};
pub use search::{filter_by_search, Searchable};
pub use sqlite_store::SqliteDocumentStore;
pub use view_scope::{FetchTicket, ViewScope};
pub use workflow::WorkflowReport;
