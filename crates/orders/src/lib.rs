//! Order domain module.
//!
//! Orders are placed once and never change afterwards; there is no lifecycle
//! beyond "placed".

pub mod order;

pub use order::{Order, OrderLineItem, OrderPlaced};
