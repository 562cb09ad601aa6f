//! Work order submission

use shared::{Actor, BatchItem, BatchOutcome, BatchProcessor};
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppResult;
use crate::services::PgStockStore;

/// Runs work orders against the PostgreSQL stock store
#[derive(Clone)]
pub struct WorkOrderService {
    processor: BatchProcessor<PgStockStore>,
}

impl WorkOrderService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        let processor = BatchProcessor::new(PgStockStore::new(db))
            .with_max_attempts(config.work_order.max_attempts);
        Self { processor }
    }

    /// Apply every item of the work order atomically on behalf of `actor`
    pub async fn submit(
        &self,
        items: &[BatchItem],
        kind: &str,
        actor: &Actor,
    ) -> AppResult<BatchOutcome> {
        tracing::debug!(
            user_id = %actor.user_id,
            kind,
            items = items.len(),
            "work order submitted"
        );

        Ok(self.processor.process(items, kind, actor).await?)
    }
}
