//! HTTP handlers for the Stockroom server

pub mod admin;
pub mod auth;
pub mod health;
pub mod materials;
pub mod reports;
pub mod transactions;
pub mod work_orders;

pub use admin::*;
pub use auth::*;
pub use health::*;
pub use materials::*;
pub use reports::{materials_report, transaction_report, transactions_report};
pub use transactions::*;
pub use work_orders::*;
