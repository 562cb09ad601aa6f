//! Administration handlers; routed behind the admin role guard

use axum::{extract::State, Json};
use shared::User;

use crate::error::AppResult;
use crate::services::AuthService;
use crate::AppState;

/// List every account
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    Ok(Json(service.list_users().await?))
}
