//! Repository abstractions: generic CRUD plus the per-entity query methods.
//!
//! Every entity gets the same five operations from [`CrudRepository`]; the
//! per-entity traits only add what the generic contract cannot express.

use async_trait::async_trait;

use storefront_core::{Entity, SkuCode};
use storefront_inventory::Inventory;
use storefront_orders::Order;
use storefront_products::Product;

pub mod error;
pub mod in_memory;
pub mod postgres;

pub use error::{RepositoryError, RepositoryResult, map_sqlx_error};
pub use in_memory::InMemoryRepository;
pub use postgres::{
    PostgresInventoryRepository, PostgresOrderRepository, PostgresProductRepository, ensure_schema,
};

/// Generic create/read/delete persistence keyed by the entity id.
#[async_trait]
pub trait CrudRepository<T>: Send + Sync
where
    T: Entity + Send + Sync + 'static,
{
    /// Insert or replace the entity stored under `entity.id()`.
    async fn save(&self, entity: T) -> RepositoryResult<T>;

    async fn find_by_id(&self, id: &T::Id) -> RepositoryResult<Option<T>>;

    async fn find_all(&self) -> RepositoryResult<Vec<T>>;

    /// Returns `true` if a row was removed.
    async fn delete_by_id(&self, id: &T::Id) -> RepositoryResult<bool>;

    async fn count(&self) -> RepositoryResult<u64>;
}

#[async_trait]
pub trait InventoryRepository: CrudRepository<Inventory> {
    /// All stored rows whose SKU is one of `sku_codes` (order unspecified).
    async fn find_by_sku_code_in(&self, sku_codes: &[SkuCode]) -> RepositoryResult<Vec<Inventory>>;
}

pub trait OrderRepository: CrudRepository<Order> {}

pub trait ProductRepository: CrudRepository<Product> {}
