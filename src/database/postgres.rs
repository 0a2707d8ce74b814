use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::database::models::{Category, Transaction, TransactionKind};
use crate::database::repository::{CategoryRepository, RepositoryError, TransactionRepository};
use crate::schema::category::{CategoryPatch, NewCategory};
use crate::schema::transaction::NewTransaction;

const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, label, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, label, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::category_not_found(id))
    }

    async fn create(&self, input: NewCategory) -> Result<Category, RepositoryError> {
        let category = Category::new(input);
        sqlx::query(
            "INSERT INTO categories (id, name, label, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.label)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::duplicate_category(&category.name)
            } else {
                RepositoryError::from(e)
            }
        })?;
        Ok(category)
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, RepositoryError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let name = patch.name.clone();
        sqlx::query_as::<_, Category>(
            r#"UPDATE categories
               SET name = COALESCE($2, name),
                   label = COALESCE($3, label),
                   updated_at = now()
               WHERE id = $1
               RETURNING id, name, label, created_at, updated_at"#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.label)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::duplicate_category(name.as_deref().unwrap_or_default())
            } else {
                RepositoryError::from(e)
            }
        })?
        .ok_or_else(|| RepositoryError::category_not_found(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::category_not_found(id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as usize)
    }
}

pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction, RepositoryError> {
    let kind: String = row.try_get("kind")?;
    let kind = TransactionKind::parse(&kind)
        .ok_or_else(|| RepositoryError::QueryError(format!("unknown transaction kind '{}'", kind)))?;

    Ok(Transaction {
        id: row.try_get("id")?,
        category: row.try_get("category")?,
        amount: row.try_get("amount")?,
        kind,
        description: row.try_get("description")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn list(&self, created_by: Option<Uuid>) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, category, amount, kind, description, created_by, created_at
               FROM transactions
               WHERE $1::uuid IS NULL OR created_by = $1
               ORDER BY created_at DESC"#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn create(&self, input: NewTransaction, created_by: Uuid) -> Result<Transaction, RepositoryError> {
        let tx = Transaction::new(input, created_by);
        sqlx::query(
            r#"INSERT INTO transactions (id, category, amount, kind, description, created_by, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(tx.id)
        .bind(&tx.category)
        .bind(tx.amount)
        .bind(tx.kind.as_str())
        .bind(&tx.description)
        .bind(tx.created_by)
        .bind(tx.created_at)
        .execute(&self.pool)
        .await?;
        Ok(tx)
    }
}
