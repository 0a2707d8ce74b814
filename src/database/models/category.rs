use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::schema::category::{CategoryPatch, NewCategory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(input: NewCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            label: input.label,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; returns true when any field changed.
    pub fn apply(&mut self, patch: CategoryPatch) -> bool {
        let mut changed = false;
        if let Some(name) = patch.name {
            if name != self.name {
                self.name = name;
                changed = true;
            }
        }
        if let Some(label) = patch.label {
            if label != self.label {
                self.label = label;
                changed = true;
            }
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}
