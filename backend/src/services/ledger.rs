//! Ledger queries
//!
//! The ledger is append-only; this service only reads it. Entries are joined
//! with their material and the acting user, falling back to a placeholder
//! name when the user row is gone.

use chrono::{DateTime, Utc};
use shared::{LedgerEntry, TransactionKind, Unit, UnknownVariant, UNKNOWN_USER};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Ledger service
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct LedgerRow {
    id: Uuid,
    material_id: Uuid,
    material_name: String,
    unit: String,
    quantity: i64,
    kind: String,
    user_id: Uuid,
    recorded_by: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = AppError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let corrupt = |e: UnknownVariant| {
            AppError::Internal(format!("Corrupt ledger row {}: {}", row.id, e))
        };
        let unit = row.unit.parse::<Unit>().map_err(corrupt)?;
        let kind = row.kind.parse::<TransactionKind>().map_err(corrupt)?;

        let recorded_by = row
            .recorded_by
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_USER.to_string());

        Ok(LedgerEntry {
            id: row.id,
            material_id: row.material_id,
            material_name: row.material_name,
            unit,
            quantity: row.quantity,
            kind,
            user_id: row.user_id,
            recorded_by,
            recorded_at: row.recorded_at,
        })
    }
}

const LEDGER_SELECT: &str = r#"
    SELECT t.id, t.material_id, m.name AS material_name, m.unit, t.quantity, t.kind,
           t.user_id, u.first_name || ' ' || u.last_name AS recorded_by, t.recorded_at
    FROM transactions t
    JOIN materials m ON m.id = t.material_id
    LEFT JOIN users u ON u.id = t.user_id
"#;

impl LedgerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Every ledger entry, most recent first
    pub async fn list_all(&self) -> AppResult<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerRow>(&format!(
            "{} ORDER BY t.recorded_at DESC, t.id",
            LEDGER_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }

    /// A single ledger entry
    pub async fn get(&self, transaction_id: Uuid) -> AppResult<LedgerEntry> {
        let row = sqlx::query_as::<_, LedgerRow>(&format!("{} WHERE t.id = $1", LEDGER_SELECT))
            .bind(transaction_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        row.try_into()
    }
}
