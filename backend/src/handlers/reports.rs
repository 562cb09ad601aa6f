//! Report download handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::{LedgerService, ReportRenderer, StockService};
use crate::AppState;

/// Wrap a rendered document as a file download
pub(crate) fn attachment(renderer: &dyn ReportRenderer, stem: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        stem,
        renderer.file_extension()
    );

    (
        [
            (header::CONTENT_TYPE, renderer.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// All materials with their current stock
pub async fn materials_report(State(state): State<AppState>) -> AppResult<Response> {
    let materials = StockService::new(state.db.clone())
        .list_materials(None)
        .await?;
    let bytes = state.renderer.render_materials(&materials)?;
    Ok(attachment(state.renderer.as_ref(), "materials", bytes))
}

/// The whole ledger, most recent first
pub async fn transactions_report(State(state): State<AppState>) -> AppResult<Response> {
    let entries = LedgerService::new(state.db.clone()).list_all().await?;
    let bytes = state.renderer.render_transactions(&entries)?;
    Ok(attachment(state.renderer.as_ref(), "transactions", bytes))
}

/// A single ledger entry
pub async fn transaction_report(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Response> {
    let entry = LedgerService::new(state.db.clone())
        .get(transaction_id)
        .await?;
    let bytes = state.renderer.render_transaction(&entry)?;
    let stem = format!("transaction-{}", entry.id);
    Ok(attachment(state.renderer.as_ref(), &stem, bytes))
}
