//! Domain models for the Stockroom service

mod batch;
mod material;
mod transaction;
mod user;

pub use batch::*;
pub use material::*;
pub use transaction::*;
pub use user::*;
