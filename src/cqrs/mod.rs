//! Command and query handlers sitting between the HTTP layer and the store.
//!
//! Each handler does its structural checks, fills in identifiers where needed
//! and then makes exactly one repository call. Repository failures come back
//! unchanged inside [`HandlerError::Repository`].

pub mod commands;
pub mod queries;

use async_trait::async_trait;
use thiserror::Error;

use crate::database::RepositoryError;

pub use commands::{
    CreateClassCommand, CreateClassHandler, DeleteClassCommand, DeleteClassHandler,
    UpdateClassCommand, UpdateClassHandler,
};
pub use queries::{
    GetClassByIdHandler, GetClassByIdQuery, GetClassesHandler, GetClassesQuery, GetExamsHandler,
    GetExamsQuery,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    /// The command itself is unacceptable (maps to 400).
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Handles a state-changing command.
#[async_trait]
pub trait CommandHandler<C: Send + 'static>: Send + Sync {
    type Output: Send;

    async fn handle(&self, command: C) -> Result<Self::Output, HandlerError>;
}

/// Handles a read-only query.
#[async_trait]
pub trait QueryHandler<Q: Send + 'static>: Send + Sync {
    type Output: Send;

    async fn handle(&self, query: Q) -> Result<Self::Output, HandlerError>;
}
