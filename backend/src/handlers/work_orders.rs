//! Work order handlers

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::{BatchItem, TransactionKind};

use crate::error::AppResult;
use crate::handlers::reports::attachment;
use crate::middleware::CurrentUser;
use crate::services::WorkOrderService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WorkOrderRequest {
    /// `receipt` or `issuance`, any case
    pub kind: String,
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Deserialize)]
pub struct WorkOrderQuery {
    /// `json` returns the outcome instead of the document
    pub format: Option<String>,
}

/// Submit a work order; responds with the work order document
pub async fn submit_work_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<WorkOrderQuery>,
    payload: Result<Json<WorkOrderRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    let service = WorkOrderService::new(state.db.clone(), &state.config);
    let outcome = service
        .submit(&body.items, &body.kind, &user.actor())
        .await?;

    if query.format.as_deref() == Some("json") {
        return Ok(Json(outcome).into_response());
    }

    let bytes = state.renderer.render_work_order(&outcome)?;
    let stem = match outcome.kind {
        TransactionKind::Receipt => "receipt",
        TransactionKind::Issuance => "issuance",
    };
    Ok(attachment(state.renderer.as_ref(), stem, bytes))
}
