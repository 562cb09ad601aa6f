//! Persistence seams for the work order processor
//!
//! A [`StockStore`] hands out one [`StockUnitOfWork`] per batch. Everything a
//! batch reads and writes goes through that unit of work, and nothing it did
//! is visible to anyone else until [`StockUnitOfWork::commit`] succeeds.
//! Dropping a unit of work without committing discards its changes.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Material, NewTransaction, Transaction};
use crate::types::Unit;

/// Failures reported by a persistence backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Another writer got in the way (lock timeout, serialization failure,
    /// deadlock, unique key race). Re-running the unit of work may succeed.
    #[error("concurrent update conflict: {0}")]
    Conflict(String),

    /// The backend could not serve the request at all
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// One atomic batch of stock and ledger changes
#[async_trait]
pub trait StockUnitOfWork: Send {
    /// Find a material by case-insensitive name and unit, locking it against
    /// other writers until this unit of work ends.
    async fn find_material(
        &mut self,
        name: &str,
        unit: Unit,
    ) -> Result<Option<Material>, StoreError>;

    /// Insert a new material with an opening quantity
    async fn create_material(
        &mut self,
        name: &str,
        unit: Unit,
        quantity: i64,
    ) -> Result<Material, StoreError>;

    /// Add `delta` (which may be negative) to a material's quantity
    async fn adjust_quantity(&mut self, material_id: Uuid, delta: i64)
        -> Result<Material, StoreError>;

    /// Append an entry to the ledger
    async fn append_transaction(
        &mut self,
        entry: NewTransaction,
    ) -> Result<Transaction, StoreError>;

    /// Make every change durable
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard every change
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Source of units of work
#[async_trait]
pub trait StockStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StockUnitOfWork>, StoreError>;
}
