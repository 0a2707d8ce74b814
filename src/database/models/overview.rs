use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Transaction, TransactionKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub category: String,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Aggregated figures shown on the overview page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
    pub category_count: usize,
    pub by_category: Vec<CategoryTotals>,
    pub generated_at: DateTime<Utc>,
}

impl Overview {
    pub fn summarize(transactions: &[Transaction], category_count: usize) -> Self {
        let mut totals: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
        let mut total_income = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;

        for tx in transactions {
            let entry = totals.entry(tx.category.as_str()).or_default();
            match tx.kind {
                TransactionKind::Income => {
                    total_income += tx.amount;
                    entry.0 += tx.amount;
                }
                TransactionKind::Expense => {
                    total_expense += tx.amount;
                    entry.1 += tx.amount;
                }
            }
        }

        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            transaction_count: transactions.len(),
            category_count,
            by_category: totals
                .into_iter()
                .map(|(category, (income, expense))| CategoryTotals {
                    category: category.to_string(),
                    income,
                    expense,
                })
                .collect(),
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::transaction::NewTransaction;
    use uuid::Uuid;

    fn tx(category: &str, amount: i64, kind: TransactionKind) -> Transaction {
        Transaction::new(
            NewTransaction {
                category: category.to_string(),
                amount: Decimal::from(amount),
                kind,
                description: None,
            },
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_summarize_groups_by_category() {
        let transactions = vec![
            tx("salary", 1000, TransactionKind::Income),
            tx("rent", 400, TransactionKind::Expense),
            tx("rent", 100, TransactionKind::Expense),
        ];

        let overview = Overview::summarize(&transactions, 2);
        assert_eq!(overview.total_income, Decimal::from(1000));
        assert_eq!(overview.total_expense, Decimal::from(500));
        assert_eq!(overview.balance, Decimal::from(500));
        assert_eq!(overview.transaction_count, 3);
        assert_eq!(overview.by_category.len(), 2);
        assert_eq!(overview.by_category[0].category, "rent");
        assert_eq!(overview.by_category[0].expense, Decimal::from(500));
    }

    #[test]
    fn test_summarize_empty() {
        let overview = Overview::summarize(&[], 0);
        assert_eq!(overview.balance, Decimal::ZERO);
        assert!(overview.by_category.is_empty());
    }
}
