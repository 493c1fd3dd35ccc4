//! In-memory repositories for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use storefront_core::{Entity, SkuCode};
use storefront_inventory::Inventory;
use storefront_orders::Order;
use storefront_products::Product;

use super::{
    CrudRepository, InventoryRepository, OrderRepository, ProductRepository, RepositoryError,
    RepositoryResult,
};

/// Keyed in-memory store implementing every repository trait.
///
/// `find_all` returns entities in first-insertion order; replacing an entity
/// keeps its original position.
#[derive(Debug)]
pub struct InMemoryRepository<T: Entity> {
    inner: RwLock<HashMap<T::Id, (u64, T)>>,
    next_seq: AtomicU64,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("in-memory store lock poisoned".to_string())
}

impl<T> InMemoryRepository<T>
where
    T: Entity + Clone,
{
    fn snapshot(&self) -> RepositoryResult<Vec<T>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<&(u64, T)> = map.values().collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, v)| v.clone()).collect())
    }
}

#[async_trait]
impl<T> CrudRepository<T> for InMemoryRepository<T>
where
    T: Entity + Clone + Send + Sync + 'static,
{
    async fn save(&self, entity: T) -> RepositoryResult<T> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let seq = match map.get(entity.id()) {
            Some((seq, _)) => *seq,
            None => self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        map.insert(entity.id().clone(), (seq, entity.clone()));
        Ok(entity)
    }

    async fn find_by_id(&self, id: &T::Id) -> RepositoryResult<Option<T>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).map(|(_, v)| v.clone()))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<T>> {
        self.snapshot()
    }

    async fn delete_by_id(&self, id: &T::Id) -> RepositoryResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(id).is_some())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.len() as u64)
    }
}

#[async_trait]
impl InventoryRepository for InMemoryRepository<Inventory> {
    async fn find_by_sku_code_in(&self, sku_codes: &[SkuCode]) -> RepositoryResult<Vec<Inventory>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|row| sku_codes.contains(row.sku_code()))
            .collect())
    }
}

impl OrderRepository for InMemoryRepository<Order> {}

impl ProductRepository for InMemoryRepository<Product> {}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{InventoryId, ProductId};
    use storefront_products::NewProduct;

    fn product(name: &str) -> Product {
        Product::create(
            ProductId::new(),
            NewProduct {
                name: name.to_string(),
                description: String::new(),
                price: 100,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_then_find_by_id() {
        let repo: InMemoryRepository<Product> = InMemoryRepository::new();
        let p = repo.save(product("Widget")).await.unwrap();

        let found = repo.find_by_id(p.id()).await.unwrap();
        assert_eq!(found, Some(p));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn save_replaces_but_keeps_listing_position() {
        let repo: InMemoryRepository<Product> = InMemoryRepository::new();
        let first = repo.save(product("First")).await.unwrap();
        repo.save(product("Second")).await.unwrap();

        let renamed = Product::restore(first.id_typed(), "First v2".into(), String::new(), 5);
        repo.save(renamed).await.unwrap();

        let names: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["First v2", "Second"]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let repo: InMemoryRepository<Product> = InMemoryRepository::new();
        let p = repo.save(product("Widget")).await.unwrap();

        assert!(repo.delete_by_id(p.id()).await.unwrap());
        assert!(!repo.delete_by_id(p.id()).await.unwrap());
        assert_eq!(repo.find_by_id(p.id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn find_by_sku_code_in_filters_rows() {
        let repo: InMemoryRepository<Inventory> = InMemoryRepository::new();
        for (sku, qty) in [("a", 1), ("b", 0), ("c", 7)] {
            let row = Inventory::new(InventoryId::new(), SkuCode::parse(sku).unwrap(), qty).unwrap();
            repo.save(row).await.unwrap();
        }

        let wanted = [SkuCode::parse("a").unwrap(), SkuCode::parse("c").unwrap(), SkuCode::parse("zz").unwrap()];
        let rows = repo.find_by_sku_code_in(&wanted).await.unwrap();

        let skus: Vec<&str> = rows.iter().map(|r| r.sku_code().as_str()).collect();
        assert_eq!(skus, vec!["a", "c"]);
    }
}
