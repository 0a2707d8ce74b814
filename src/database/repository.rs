use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Category, Transaction};
use crate::schema::category::{CategoryPatch, NewCategory};
use crate::schema::transaction::NewTransaction;

/// Errors shared by every repository implementation
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn category_not_found(id: Uuid) -> Self {
        RepositoryError::NotFound(format!("category {} not found", id))
    }

    pub fn duplicate_category(name: &str) -> Self {
        RepositoryError::Conflict(format!("category '{}' already exists", name))
    }
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError>;

    async fn get(&self, id: Uuid) -> Result<Category, RepositoryError>;

    /// Fails with `Conflict` when another category already uses the name.
    async fn create(&self, input: NewCategory) -> Result<Category, RepositoryError>;

    /// Apply a partial update; an empty patch returns the stored row unchanged.
    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Newest first, optionally limited to one author.
    async fn list(&self, created_by: Option<Uuid>) -> Result<Vec<Transaction>, RepositoryError>;

    async fn create(&self, input: NewTransaction, created_by: Uuid) -> Result<Transaction, RepositoryError>;
}
