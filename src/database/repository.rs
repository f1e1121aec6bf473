use async_trait::async_trait;
use thiserror::Error;

use crate::models::Class;

/// Errors from a class store
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store could not be reached (server selection, network, timeout).
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Query error: {0}")]
    Query(String),
}

/// Persistence for Class documents, keyed by `Class::id`.
#[async_trait]
pub trait ClassRepository: Send + Sync {
    /// Every class in insertion order.
    async fn get_all(&self) -> Result<Vec<Class>, RepositoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Class>, RepositoryError>;

    async fn create(&self, class: &Class) -> Result<(), RepositoryError>;

    /// Replace the stored document with the same id. Missing ids are a no-op.
    async fn update(&self, class: &Class) -> Result<(), RepositoryError>;

    /// Missing ids are a no-op.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Round-trip to the store for health reporting.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Component name in the health report.
    fn backend_name(&self) -> &'static str;

    fn database_name(&self) -> &str;
}
