//! Shared types and the work order core for the Stockroom service
//!
//! Holds the domain model, input validation, the batch processor and the
//! persistence traits it runs against. The server crate supplies the
//! Postgres-backed store; [`memory::InMemoryStockStore`] serves tests and
//! local tooling.

pub mod memory;
pub mod models;
pub mod processor;
pub mod store;
pub mod types;
pub mod validation;

pub use models::*;
pub use processor::*;
pub use store::*;
pub use types::*;
pub use validation::*;
