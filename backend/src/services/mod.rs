//! Business logic services for the Stockroom server

pub mod auth;
pub mod ledger;
pub mod reporting;
pub mod stock;
pub mod work_order;

pub use auth::AuthService;
pub use ledger::LedgerService;
pub use reporting::{CsvReportRenderer, ReportRenderer};
pub use stock::{PgStockStore, StockService};
pub use work_order::WorkOrderService;
