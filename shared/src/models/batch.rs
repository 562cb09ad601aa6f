//! Work order (bulk transaction) request and outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Role, TransactionKind, Unit};

/// One line of an incoming work order, exactly as submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub name: String,
    pub quantity: i64,
    pub unit: String,
}

impl BatchItem {
    pub fn new(name: impl Into<String>, quantity: i64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

/// A batch item that passed field validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedItem {
    pub name: String,
    pub quantity: i64,
    pub unit: Unit,
}

/// The user on whose behalf a batch runs, as supplied by the identity layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: Role,
}

/// A processed batch item paired with what it touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub material_id: Uuid,
    pub transaction_id: Uuid,
    pub name: String,
    pub unit: Unit,
    pub quantity: i64,
    /// Material stock level right after this item was applied
    pub balance_after: i64,
}

/// Result of a committed work order, ready for the report renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub kind: TransactionKind,
    pub items: Vec<ResolvedItem>,
    pub user_id: Uuid,
    pub performed_by: String,
    pub processed_at: DateTime<Utc>,
}
