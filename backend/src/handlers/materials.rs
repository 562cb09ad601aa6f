//! Stock overview handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::Material;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::StockService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MaterialQuery {
    /// Case-insensitive substring of the material name
    pub search: Option<String>,
}

/// List materials
pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialQuery>,
) -> AppResult<Json<Vec<Material>>> {
    let service = StockService::new(state.db.clone());
    let materials = service.list_materials(query.search.as_deref()).await?;
    Ok(Json(materials))
}

/// Get a material by id
pub async fn get_material(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<Material>> {
    let service = StockService::new(state.db.clone());
    let material = service.get_material(material_id).await?;
    Ok(Json(material))
}
