pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::DatabaseManager;
pub use memory::{MemoryCategoryRepository, MemoryTransactionRepository};
pub use postgres::{PgCategoryRepository, PgTransactionRepository};
pub use repository::{CategoryRepository, RepositoryError, TransactionRepository};
