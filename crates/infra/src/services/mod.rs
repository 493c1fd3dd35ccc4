//! Application services: the operations the HTTP layer calls.
//!
//! Services own no state beyond their collaborators; all persistence goes
//! through the repository traits so the same code runs against in-memory and
//! Postgres stores.

pub mod error;
pub mod inventory;
pub mod orders;
pub mod products;

pub use error::{ServiceError, ServiceResult};
pub use inventory::{InventoryService, StockChecker};
pub use orders::{ORDER_AGGREGATE_TYPE, OrderService};
pub use products::ProductService;
