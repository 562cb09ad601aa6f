//! Ledger handlers

use axum::{
    extract::{Path, State},
    Json,
};
use shared::LedgerEntry;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::LedgerService;
use crate::AppState;

/// List ledger entries, most recent first
pub async fn list_transactions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LedgerEntry>>> {
    let service = LedgerService::new(state.db.clone());
    Ok(Json(service.list_all().await?))
}

/// Get a ledger entry by id
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<LedgerEntry>> {
    let service = LedgerService::new(state.db.clone());
    Ok(Json(service.get(transaction_id).await?))
}
