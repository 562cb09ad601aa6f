//! Stock store backed by PostgreSQL
//!
//! [`PgStockStore`] is the production [`StockStore`]: every unit of work is a
//! database transaction, and material lookups take a row lock so the stock
//! check and the update for one material cannot interleave with another
//! writer. [`StockService`] is the read side used by listings and reports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    Material, NewTransaction, StockStore, StockUnitOfWork, StoreError, Transaction,
    TransactionKind, Unit, UnknownVariant,
};
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// How long a unit of work waits for a row lock before giving up
const LOCK_TIMEOUT: &str = "5s";

/// Row for material queries
#[derive(Debug, FromRow)]
pub(crate) struct MaterialRow {
    id: Uuid,
    name: String,
    quantity: i64,
    unit: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MaterialRow> for Material {
    type Error = UnknownVariant;

    fn try_from(row: MaterialRow) -> Result<Self, Self::Error> {
        Ok(Material {
            id: row.id,
            name: row.name,
            quantity: row.quantity,
            unit: row.unit.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row for ledger inserts
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    material_id: Uuid,
    quantity: i64,
    kind: String,
    user_id: Uuid,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = UnknownVariant;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: row.id,
            material_id: row.material_id,
            quantity: row.quantity,
            kind: row.kind.parse::<TransactionKind>()?,
            user_id: row.user_id,
            recorded_at: row.recorded_at,
        })
    }
}

/// Classify a database error for the processor's retry logic
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // serialization_failure, deadlock_detected, unique_violation, lock_not_available
        if let Some(code) = db_err.code() {
            if matches!(code.as_ref(), "40001" | "40P01" | "23505" | "55P03") {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
    }
    StoreError::Unavailable(err.to_string())
}

fn corrupt_row(err: UnknownVariant) -> StoreError {
    StoreError::Unavailable(format!("corrupt row: {}", err))
}

/// PostgreSQL implementation of [`StockStore`]
#[derive(Clone)]
pub struct PgStockStore {
    db: PgPool,
}

impl PgStockStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn begin(&self) -> Result<Box<dyn StockUnitOfWork>, StoreError> {
        let mut tx = self.db.begin().await.map_err(store_error)?;

        sqlx::query(&format!("SET LOCAL lock_timeout = '{}'", LOCK_TIMEOUT))
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

struct PgUnitOfWork {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl StockUnitOfWork for PgUnitOfWork {
    async fn find_material(
        &mut self,
        name: &str,
        unit: Unit,
    ) -> Result<Option<Material>, StoreError> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, quantity, unit, created_at, updated_at
            FROM materials
            WHERE lower(name) = lower($1) AND unit = $2
            FOR UPDATE
            "#,
        )
        .bind(name)
        .bind(unit.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(store_error)?;

        row.map(Material::try_from).transpose().map_err(corrupt_row)
    }

    async fn create_material(
        &mut self,
        name: &str,
        unit: Unit,
        quantity: i64,
    ) -> Result<Material, StoreError> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            INSERT INTO materials (name, unit, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, name, quantity, unit, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(unit.as_str())
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Material::try_from(row).map_err(corrupt_row)
    }

    async fn adjust_quantity(
        &mut self,
        material_id: Uuid,
        delta: i64,
    ) -> Result<Material, StoreError> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            UPDATE materials
            SET quantity = quantity + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, quantity, unit, created_at, updated_at
            "#,
        )
        .bind(material_id)
        .bind(delta)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Material::try_from(row).map_err(corrupt_row)
    }

    async fn append_transaction(
        &mut self,
        entry: NewTransaction,
    ) -> Result<Transaction, StoreError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (material_id, quantity, kind, user_id, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, material_id, quantity, kind, user_id, recorded_at
            "#,
        )
        .bind(entry.material_id)
        .bind(entry.quantity)
        .bind(entry.kind.as_str())
        .bind(entry.user_id)
        .bind(entry.recorded_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Transaction::try_from(row).map_err(corrupt_row)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(store_error)
    }
}

/// Read-only queries over the stock table
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List materials ordered by name, optionally filtered by a
    /// case-insensitive substring of the name
    pub async fn list_materials(&self, search: Option<&str>) -> AppResult<Vec<Material>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let rows = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, quantity, unit, created_at, updated_at
            FROM materials
            WHERE $1::TEXT IS NULL OR name ILIKE $1
            ORDER BY lower(name), unit
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| Material::try_from(row).map_err(corrupt_material))
            .collect()
    }

    /// Get a single material
    pub async fn get_material(&self, material_id: Uuid) -> AppResult<Material> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, quantity, unit, created_at, updated_at
            FROM materials
            WHERE id = $1
            "#,
        )
        .bind(material_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        Material::try_from(row).map_err(corrupt_material)
    }
}

fn corrupt_material(err: UnknownVariant) -> AppError {
    AppError::Internal(format!("Corrupt material row: {}", err))
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
