//! Product catalog domain module.

pub mod product;

pub use product::{NewProduct, Product};
