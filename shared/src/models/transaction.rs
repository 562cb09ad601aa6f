//! Ledger entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{TransactionKind, Unit};

/// Display name used when a ledger entry's user no longer resolves
pub const UNKNOWN_USER: &str = "Unknown user";

/// One recorded quantity change; immutable once written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub material_id: Uuid,
    /// Always positive; the kind gives the sign
    pub quantity: i64,
    pub kind: TransactionKind,
    pub user_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    pub fn signed_quantity(&self) -> i64 {
        self.kind.signed(self.quantity)
    }
}

/// A transaction about to be appended to the ledger
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub material_id: Uuid,
    pub quantity: i64,
    pub kind: TransactionKind,
    pub user_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

/// Ledger entry joined with its material and acting user, for listings and reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub material_id: Uuid,
    pub material_name: String,
    pub unit: Unit,
    pub quantity: i64,
    pub kind: TransactionKind,
    pub user_id: Uuid,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}
