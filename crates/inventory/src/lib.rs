//! Inventory domain module.
//!
//! This crate contains the stock rules for inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod seed;
pub mod stock;

pub use seed::{SeedRow, default_seed};
pub use stock::{Inventory, StockStatus, stock_statuses};
