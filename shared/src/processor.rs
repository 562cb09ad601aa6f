//! Work order processing
//!
//! A work order is a batch of named quantity changes applied together as
//! either a receipt or an issuance. The batch is validated up front, then
//! applied item by item inside a single unit of work. Any rejection rolls the
//! whole batch back.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Actor, BatchItem, BatchOutcome, NewTransaction, ResolvedItem, ValidatedItem};
use crate::store::{StockStore, StockUnitOfWork, StoreError};
use crate::types::{TransactionKind, Unit};
use crate::validation::{find_duplicate_names, validate_batch_item};

/// Attempts made when the store keeps reporting conflicts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Why a work order was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("item {index}: invalid {field}: {message}")]
    FieldValidation {
        /// Zero-based position in the submitted batch
        index: usize,
        field: &'static str,
        message: String,
    },

    #[error("duplicate items in work order: {}", names.join(", "))]
    DuplicateItems { names: Vec<String> },

    #[error("unknown transaction kind '{0}'")]
    UnknownTransactionKind(String),

    #[error("material '{name}' with unit {unit} does not exist")]
    MaterialNotFound { name: String, unit: Unit },

    #[error("insufficient stock for '{name}' ({unit}): requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        unit: Unit,
        requested: i64,
        available: i64,
    },

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Applies work orders against a [`StockStore`]
#[derive(Clone)]
pub struct BatchProcessor<S> {
    store: S,
    max_attempts: u32,
}

impl<S: StockStore> BatchProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Number of times a conflicting batch is re-run before giving up
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and apply a work order on behalf of `actor`.
    ///
    /// `kind` is the raw transaction kind from the request. On success every
    /// stock change and ledger entry for the batch has been committed; on
    /// error nothing has.
    pub async fn process(
        &self,
        items: &[BatchItem],
        kind: &str,
        actor: &Actor,
    ) -> Result<BatchOutcome, BatchError> {
        let (items, kind) = validate_batch(items, kind)?;

        let mut attempt = 1;
        loop {
            let processed_at = Utc::now();
            match self.run_once(&items, kind, actor, processed_at).await {
                Ok(resolved) => {
                    tracing::info!(
                        kind = kind.as_str(),
                        items = resolved.len(),
                        user_id = %actor.user_id,
                        attempt,
                        "work order committed"
                    );
                    return Ok(BatchOutcome {
                        kind,
                        items: resolved,
                        user_id: actor.user_id,
                        performed_by: actor.display_name.clone(),
                        processed_at,
                    });
                }
                Err(BatchError::Persistence(err)) if err.is_conflict() && attempt < self.max_attempts => {
                    tracing::warn!(attempt, error = %err, "work order conflicted, retrying");
                    attempt += 1;
                }
                Err(err) => {
                    tracing::debug!(kind = kind.as_str(), error = %err, "work order rejected");
                    return Err(err);
                }
            }
        }
    }

    /// One pass over the batch in a fresh unit of work
    async fn run_once(
        &self,
        items: &[ValidatedItem],
        kind: TransactionKind,
        actor: &Actor,
        recorded_at: DateTime<Utc>,
    ) -> Result<Vec<ResolvedItem>, BatchError> {
        let mut uow = self.store.begin().await?;

        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            match apply_item(uow.as_mut(), item, kind, actor, recorded_at).await {
                Ok(entry) => resolved.push(entry),
                Err(err) => {
                    if let Err(rollback_err) = uow.rollback().await {
                        tracing::warn!(error = %rollback_err, "rollback failed");
                    }
                    return Err(err);
                }
            }
        }

        uow.commit().await?;
        Ok(resolved)
    }
}

/// Run every check that needs no store access, in order: item fields,
/// duplicate names, then the transaction kind.
pub fn validate_batch(
    items: &[BatchItem],
    kind: &str,
) -> Result<(Vec<ValidatedItem>, TransactionKind), BatchError> {
    if items.is_empty() {
        return Err(BatchError::FieldValidation {
            index: 0,
            field: "items",
            message: "Work order must contain at least one item".to_string(),
        });
    }

    let validated = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            validate_batch_item(item).map_err(|v| BatchError::FieldValidation {
                index,
                field: v.field,
                message: v.message,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let duplicates = find_duplicate_names(validated.iter().map(|item| item.name.as_str()));
    if !duplicates.is_empty() {
        return Err(BatchError::DuplicateItems { names: duplicates });
    }

    let kind = kind
        .parse::<TransactionKind>()
        .map_err(|_| BatchError::UnknownTransactionKind(kind.to_string()))?;

    Ok((validated, kind))
}

async fn apply_item(
    uow: &mut dyn StockUnitOfWork,
    item: &ValidatedItem,
    kind: TransactionKind,
    actor: &Actor,
    recorded_at: DateTime<Utc>,
) -> Result<ResolvedItem, BatchError> {
    let existing = uow.find_material(&item.name, item.unit).await?;

    let material = match (kind, existing) {
        (TransactionKind::Receipt, Some(material)) => {
            uow.adjust_quantity(material.id, item.quantity).await?
        }
        (TransactionKind::Receipt, None) => {
            uow.create_material(&item.name, item.unit, item.quantity)
                .await?
        }
        (TransactionKind::Issuance, None) => {
            return Err(BatchError::MaterialNotFound {
                name: item.name.clone(),
                unit: item.unit,
            });
        }
        (TransactionKind::Issuance, Some(material)) => {
            if material.quantity < item.quantity {
                return Err(BatchError::InsufficientStock {
                    name: item.name.clone(),
                    unit: item.unit,
                    requested: item.quantity,
                    available: material.quantity,
                });
            }
            uow.adjust_quantity(material.id, -item.quantity).await?
        }
    };

    let transaction = uow
        .append_transaction(NewTransaction {
            material_id: material.id,
            quantity: item.quantity,
            kind,
            user_id: actor.user_id,
            recorded_at,
        })
        .await?;

    Ok(ResolvedItem {
        material_id: material.id,
        transaction_id: transaction.id,
        name: material.name,
        unit: material.unit,
        quantity: item.quantity,
        balance_after: material.quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_batch_checks_fields_before_duplicates() {
        let items = vec![
            BatchItem::new("Cement", 5, "kg"),
            BatchItem::new("cement", 0, "kg"),
        ];
        let err = validate_batch(&items, "receipt").unwrap_err();
        assert!(matches!(
            err,
            BatchError::FieldValidation { index: 1, field: "quantity", .. }
        ));
    }

    #[test]
    fn test_validate_batch_checks_duplicates_before_kind() {
        let items = vec![
            BatchItem::new("Cement", 5, "kg"),
            BatchItem::new("CEMENT", 10, "kg"),
        ];
        let err = validate_batch(&items, "transfer").unwrap_err();
        assert_eq!(
            err,
            BatchError::DuplicateItems {
                names: vec!["cement".to_string()]
            }
        );
    }

    #[test]
    fn test_validate_batch_duplicates_ignore_unit() {
        let items = vec![
            BatchItem::new("Cement", 5, "kg"),
            BatchItem::new("Cement", 1, "ton"),
        ];
        assert!(matches!(
            validate_batch(&items, "receipt"),
            Err(BatchError::DuplicateItems { .. })
        ));
    }

    #[test]
    fn test_validate_batch_unknown_kind() {
        let items = vec![BatchItem::new("Cement", 5, "kg")];
        assert_eq!(
            validate_batch(&items, "transfer").unwrap_err(),
            BatchError::UnknownTransactionKind("transfer".to_string())
        );
    }

    #[test]
    fn test_validate_batch_empty() {
        assert!(matches!(
            validate_batch(&[], "receipt"),
            Err(BatchError::FieldValidation { field: "items", .. })
        ));
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = BatchError::InsufficientStock {
            name: "Cement".to_string(),
            unit: Unit::Kilogram,
            requested: 10,
            available: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for 'Cement' (kg): requested 10, available 5"
        );
    }
}
