//! In-memory stock store
//!
//! Units of work hold the store's lock for their whole lifetime, so batches
//! are fully serialized. Changes are staged on a copy of the state and only
//! swapped in on commit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::{Material, MaterialKey, NewTransaction, Transaction};
use crate::store::{StockStore, StockUnitOfWork, StoreError};
use crate::types::Unit;

#[derive(Debug, Clone, Default)]
struct State {
    materials: Vec<Material>,
    transactions: Vec<Transaction>,
}

/// Stock store backed by process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockStore {
    state: Arc<Mutex<State>>,
    /// Conflicts still to be injected at commit time
    pending_conflicts: Arc<Mutex<u32>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` commits fail with [`StoreError::Conflict`]
    pub async fn fail_next_commits(&self, count: u32) {
        *self.pending_conflicts.lock().await = count;
    }

    /// Snapshot of all materials, ordered by name
    pub async fn materials(&self) -> Vec<Material> {
        let mut materials = self.state.lock().await.materials.clone();
        materials.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        materials
    }

    /// Snapshot of the ledger, most recent first
    pub async fn transactions(&self) -> Vec<Transaction> {
        let mut transactions = self.state.lock().await.transactions.clone();
        transactions.reverse();
        transactions
    }

    pub async fn material(&self, name: &str, unit: Unit) -> Option<Material> {
        let key = MaterialKey::new(name, unit);
        self.state
            .lock()
            .await
            .materials
            .iter()
            .find(|m| m.key() == key)
            .cloned()
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn begin(&self) -> Result<Box<dyn StockUnitOfWork>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = State::clone(&guard);
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            staged,
            pending_conflicts: self.pending_conflicts.clone(),
        }))
    }
}

struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<State>,
    staged: State,
    pending_conflicts: Arc<Mutex<u32>>,
}

impl InMemoryUnitOfWork {
    fn material_mut(&mut self, material_id: Uuid) -> Result<&mut Material, StoreError> {
        self.staged
            .materials
            .iter_mut()
            .find(|m| m.id == material_id)
            .ok_or_else(|| StoreError::Unavailable(format!("material {} vanished", material_id)))
    }
}

#[async_trait]
impl StockUnitOfWork for InMemoryUnitOfWork {
    async fn find_material(
        &mut self,
        name: &str,
        unit: Unit,
    ) -> Result<Option<Material>, StoreError> {
        let key = MaterialKey::new(name, unit);
        Ok(self
            .staged
            .materials
            .iter()
            .find(|m| m.key() == key)
            .cloned())
    }

    async fn create_material(
        &mut self,
        name: &str,
        unit: Unit,
        quantity: i64,
    ) -> Result<Material, StoreError> {
        let key = MaterialKey::new(name, unit);
        if self.staged.materials.iter().any(|m| m.key() == key) {
            return Err(StoreError::Conflict(format!(
                "material '{}' ({}) already exists",
                name, unit
            )));
        }

        let now = Utc::now();
        let material = Material {
            id: Uuid::new_v4(),
            name: name.to_string(),
            quantity,
            unit,
            created_at: now,
            updated_at: now,
        };
        self.staged.materials.push(material.clone());
        Ok(material)
    }

    async fn adjust_quantity(
        &mut self,
        material_id: Uuid,
        delta: i64,
    ) -> Result<Material, StoreError> {
        let material = self.material_mut(material_id)?;
        let quantity = material
            .quantity
            .checked_add(delta)
            .filter(|q| *q >= 0)
            .ok_or_else(|| {
                StoreError::Unavailable(format!("quantity of material {} out of range", material_id))
            })?;
        material.quantity = quantity;
        material.updated_at = Utc::now();
        Ok(material.clone())
    }

    async fn append_transaction(
        &mut self,
        entry: NewTransaction,
    ) -> Result<Transaction, StoreError> {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            material_id: entry.material_id,
            quantity: entry.quantity,
            kind: entry.kind,
            user_id: entry.user_id,
            recorded_at: entry.recorded_at,
        };
        self.staged.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut this = self;
        {
            let mut pending = this.pending_conflicts.lock().await;
            if *pending > 0 {
                *pending -= 1;
                return Err(StoreError::Conflict("injected commit conflict".to_string()));
            }
        }
        let staged = std::mem::take(&mut this.staged);
        *this.guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
