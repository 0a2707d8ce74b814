//! In-memory repositories, used when no database is configured and in tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Category, Transaction};
use crate::database::repository::{CategoryRepository, RepositoryError, TransactionRepository};
use crate::schema::category::{CategoryPatch, NewCategory};
use crate::schema::transaction::NewTransaction;

#[derive(Default)]
pub struct MemoryCategoryRepository {
    categories: RwLock<Vec<Category>>,
}

impl MemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = self.categories.read().await;
        let mut out = categories.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn get(&self, id: Uuid) -> Result<Category, RepositoryError> {
        let categories = self.categories.read().await;
        categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::category_not_found(id))
    }

    async fn create(&self, input: NewCategory) -> Result<Category, RepositoryError> {
        let mut categories = self.categories.write().await;
        if categories.iter().any(|c| c.name == input.name) {
            return Err(RepositoryError::duplicate_category(&input.name));
        }
        let category = Category::new(input);
        categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, RepositoryError> {
        let mut categories = self.categories.write().await;

        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| RepositoryError::category_not_found(id))?;

        if let Some(name) = &patch.name {
            if categories.iter().any(|c| c.id != id && &c.name == name) {
                return Err(RepositoryError::duplicate_category(name));
            }
        }

        let category = &mut categories[index];
        category.apply(patch);
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut categories = self.categories.write().await;
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(RepositoryError::category_not_found(id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.categories.read().await.len())
    }
}

#[derive(Default)]
pub struct MemoryTransactionRepository {
    transactions: RwLock<Vec<Transaction>>,
}

impl MemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for MemoryTransactionRepository {
    async fn list(&self, created_by: Option<Uuid>) -> Result<Vec<Transaction>, RepositoryError> {
        let transactions = self.transactions.read().await;
        let mut out: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| created_by.map_or(true, |author| tx.created_by == author))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn create(&self, input: NewTransaction, created_by: Uuid) -> Result<Transaction, RepositoryError> {
        let tx = Transaction::new(input, created_by);
        self.transactions.write().await.push(tx.clone());
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TransactionKind;
    use rust_decimal::Decimal;

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            label: name.to_uppercase(),
        }
    }

    #[tokio::test]
    async fn test_category_crud() {
        let repo = MemoryCategoryRepository::new();
        let created = repo.create(new_category("rent")).await.unwrap();
        assert_eq!(repo.get(created.id).await.unwrap(), created);

        let updated = repo
            .update(created.id, CategoryPatch { name: None, label: Some("Housing".into()) })
            .await
            .unwrap();
        assert_eq!(updated.name, "rent");
        assert_eq!(updated.label, "Housing");

        repo.delete(created.id).await.unwrap();
        assert!(matches!(repo.get(created.id).await, Err(RepositoryError::NotFound(_))));
        assert!(matches!(repo.delete(created.id).await, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_category_names_are_unique() {
        let repo = MemoryCategoryRepository::new();
        repo.create(new_category("rent")).await.unwrap();
        let food = repo.create(new_category("food")).await.unwrap();

        assert!(matches!(repo.create(new_category("rent")).await, Err(RepositoryError::Conflict(_))));
        let rename = CategoryPatch { name: Some("rent".into()), label: None };
        assert!(matches!(repo.update(food.id, rename).await, Err(RepositoryError::Conflict(_))));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_before_conflict() {
        let repo = MemoryCategoryRepository::new();
        repo.create(new_category("rent")).await.unwrap();

        let rename = CategoryPatch { name: Some("rent".into()), label: None };
        let result = repo.update(Uuid::new_v4(), rename).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_transactions_filter_by_author() {
        let repo = MemoryTransactionRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let input = NewTransaction {
            category: "rent".into(),
            amount: Decimal::from(10),
            kind: TransactionKind::Expense,
            description: None,
        };
        repo.create(input.clone(), alice).await.unwrap();
        repo.create(input.clone(), bob).await.unwrap();
        repo.create(input, alice).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 3);
        let mine = repo.list(Some(alice)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|tx| tx.created_by == alice));
    }
}
