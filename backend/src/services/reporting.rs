//! Report documents for work orders, the ledger and the stock overview
//!
//! Handlers depend on [`ReportRenderer`] only; the format is chosen by
//! whichever renderer is wired in. [`CsvReportRenderer`] is the one we ship.

use chrono::{DateTime, Utc};
use shared::{BatchOutcome, LedgerEntry, Material, TransactionKind};

use crate::error::{AppError, AppResult};

/// Date format used in every document
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Produces downloadable documents
pub trait ReportRenderer: Send + Sync {
    /// MIME type of the produced documents
    fn content_type(&self) -> &'static str;

    /// File extension without the dot
    fn file_extension(&self) -> &'static str;

    /// Document for a committed work order
    fn render_work_order(&self, outcome: &BatchOutcome) -> AppResult<Vec<u8>>;

    /// Document for a single ledger entry
    fn render_transaction(&self, entry: &LedgerEntry) -> AppResult<Vec<u8>>;

    /// Document listing ledger entries in the given order
    fn render_transactions(&self, entries: &[LedgerEntry]) -> AppResult<Vec<u8>>;

    /// Stock overview
    fn render_materials(&self, materials: &[Material]) -> AppResult<Vec<u8>>;
}

/// Document title for a work order of the given kind
pub fn work_order_title(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Receipt => "Receipt work order",
        TransactionKind::Issuance => "Issuance work order",
    }
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Receipt => "Receipt",
        TransactionKind::Issuance => "Issuance",
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// CSV renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportRenderer;

impl CsvReportRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write<F>(build: F) -> AppResult<Vec<u8>>
    where
        F: FnOnce(&mut csv::Writer<Vec<u8>>) -> csv::Result<()>,
    {
        // Header blocks and tables differ in width
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(vec![]);

        build(&mut wtr)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;

        wtr.into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))
    }
}

impl ReportRenderer for CsvReportRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn render_work_order(&self, outcome: &BatchOutcome) -> AppResult<Vec<u8>> {
        Self::write(|wtr| {
            wtr.write_record([work_order_title(outcome.kind)])?;
            wtr.write_record(["Created by", outcome.performed_by.as_str()])?;
            wtr.write_record(["Date", format_date(outcome.processed_at).as_str()])?;
            wtr.write_record(["Material", "Unit", "Quantity"])?;
            for item in &outcome.items {
                let quantity = item.quantity.to_string();
                wtr.write_record([item.name.as_str(), item.unit.as_str(), quantity.as_str()])?;
            }
            Ok(())
        })
    }

    fn render_transaction(&self, entry: &LedgerEntry) -> AppResult<Vec<u8>> {
        Self::write(|wtr| {
            wtr.write_record(["Transaction", entry.id.to_string().as_str()])?;
            wtr.write_record(["Kind", kind_label(entry.kind)])?;
            wtr.write_record(["Material", entry.material_name.as_str()])?;
            wtr.write_record(["Unit", entry.unit.as_str()])?;
            wtr.write_record(["Quantity", entry.quantity.to_string().as_str()])?;
            wtr.write_record(["Recorded by", entry.recorded_by.as_str()])?;
            wtr.write_record(["Date", format_date(entry.recorded_at).as_str()])?;
            Ok(())
        })
    }

    fn render_transactions(&self, entries: &[LedgerEntry]) -> AppResult<Vec<u8>> {
        Self::write(|wtr| {
            wtr.write_record(["Date", "Kind", "Material", "Unit", "Quantity", "Recorded by"])?;
            for entry in entries {
                let date = format_date(entry.recorded_at);
                let quantity = entry.quantity.to_string();
                wtr.write_record([
                    date.as_str(),
                    kind_label(entry.kind),
                    entry.material_name.as_str(),
                    entry.unit.as_str(),
                    quantity.as_str(),
                    entry.recorded_by.as_str(),
                ])?;
            }
            Ok(())
        })
    }

    fn render_materials(&self, materials: &[Material]) -> AppResult<Vec<u8>> {
        Self::write(|wtr| {
            wtr.write_record(["Material", "Unit", "Quantity", "Last updated"])?;
            for material in materials {
                let quantity = material.quantity.to_string();
                let updated = format_date(material.updated_at);
                wtr.write_record([
                    material.name.as_str(),
                    material.unit.as_str(),
                    quantity.as_str(),
                    updated.as_str(),
                ])?;
            }
            Ok(())
        })
    }
}
