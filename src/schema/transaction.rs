use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::ValidationError;
use crate::database::models::TransactionKind;

fn validate_positive_amount(value: &Decimal) -> Result<(), validator::ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(validator::ValidationError::new("amount_not_positive")
            .with_message("Amount must be greater than zero".into()));
    }
    Ok(())
}

/// Validated transaction create payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewTransaction {
    #[validate(length(min = 1, message = "Transaction category is required"))]
    pub category: String,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    pub kind: TransactionKind,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    #[serde(default)]
    pub description: Option<String>,
}

pub fn validate_create(input: &Value) -> Result<NewTransaction, ValidationError> {
    let tx: NewTransaction = serde_json::from_value(input.clone())
        .map_err(|e| ValidationError::new(format!("Invalid transaction: {}", e)))?;

    if let Err(errors) = tx.validate() {
        let mut error = ValidationError::new("Invalid transaction");
        error.absorb(&errors);
        return Err(error);
    }

    Ok(tx)
}
