//! Integration tests for the service layer over in-memory repositories.
//!
//! Tests: seed → InventoryService / OrderService → repositories → event bus
//!
//! Verifies:
//! - the in-stock rule holds end to end (seeded example included)
//! - orders are only stored and announced when every SKU is in stock
//! - products round-trip through the generic repository

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::Value as JsonValue;

    use storefront_core::{OrderId, ProductId, SkuCode};
    use storefront_events::{EventBus, EventEnvelope, InMemoryEventBus};
    use storefront_inventory::{Inventory, SeedRow, StockStatus};
    use storefront_orders::{Order, OrderLineItem};
    use storefront_products::{NewProduct, Product};

    use crate::repository::{CrudRepository, InMemoryRepository, RepositoryError};
    use crate::seed::{seed_inventory, seed_rows};
    use crate::services::{
        InventoryService, ORDER_AGGREGATE_TYPE, OrderService, ProductService, ServiceError,
        ServiceResult, StockChecker,
    };

    type Bus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;

    fn sku(s: &str) -> SkuCode {
        SkuCode::parse(s).unwrap()
    }

    fn line(s: &str, quantity: i64) -> OrderLineItem {
        OrderLineItem::new(sku(s), 99_900, quantity).unwrap()
    }

    struct Fixture {
        inventory_repo: Arc<InMemoryRepository<Inventory>>,
        order_repo: Arc<InMemoryRepository<Order>>,
        inventory: Arc<InventoryService>,
        orders: OrderService<Bus>,
        bus: Bus,
    }

    async fn setup() -> Fixture {
        let inventory_repo: Arc<InMemoryRepository<Inventory>> = Arc::new(InMemoryRepository::new());
        let order_repo: Arc<InMemoryRepository<Order>> = Arc::new(InMemoryRepository::new());
        let bus: Bus = Arc::new(InMemoryEventBus::new());

        seed_inventory(inventory_repo.as_ref()).await.unwrap();

        let inventory = Arc::new(InventoryService::new(inventory_repo.clone()));
        let orders = OrderService::new(order_repo.clone(), inventory.clone(), bus.clone());

        Fixture {
            inventory_repo,
            order_repo,
            inventory,
            orders,
            bus,
        }
    }

    #[tokio::test]
    async fn seeded_skus_report_expected_stock() {
        let fx = setup().await;

        let statuses = fx
            .inventory
            .is_in_stock(&[sku("iphone_15"), sku("iphone_15_pro")])
            .await
            .unwrap();

        assert_eq!(
            statuses,
            vec![
                StockStatus { sku_code: sku("iphone_15"), is_in_stock: true },
                StockStatus { sku_code: sku("iphone_15_pro"), is_in_stock: false },
            ]
        );
    }

    #[tokio::test]
    async fn unknown_skus_and_empty_queries_yield_nothing() {
        let fx = setup().await;

        assert!(fx.inventory.is_in_stock(&[]).await.unwrap().is_empty());
        assert!(fx.inventory.is_in_stock(&[sku("pixel_8")]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeding_twice_keeps_existing_rows() {
        let fx = setup().await;
        fx.inventory.save_stock(sku("iphone_15"), 3).await.unwrap();

        let inserted = seed_inventory(fx.inventory_repo.as_ref()).await.unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(fx.inventory_repo.count().await.unwrap(), 2);

        let rows = fx.inventory_repo.find_all().await.unwrap();
        let iphone = rows.iter().find(|r| r.sku_code() == &sku("iphone_15")).unwrap();
        assert_eq!(iphone.quantity(), 3);
    }

    #[tokio::test]
    async fn seed_rows_only_inserts_missing_skus() {
        let fx = setup().await;

        let inserted = seed_rows(
            fx.inventory_repo.as_ref(),
            vec![
                SeedRow { sku_code: sku("iphone_15"), quantity: 1 },
                SeedRow { sku_code: sku("pixel_8"), quantity: 4 },
            ],
        )
        .await
        .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(fx.inventory_repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn save_stock_updates_the_existing_row_in_place() {
        let fx = setup().await;

        let before = fx.inventory_repo.count().await.unwrap();
        let saved = fx.inventory.save_stock(sku("iphone_15_pro"), 5).await.unwrap();

        assert_eq!(saved.quantity(), 5);
        assert_eq!(fx.inventory_repo.count().await.unwrap(), before);

        let statuses = fx.inventory.is_in_stock(&[sku("iphone_15_pro")]).await.unwrap();
        assert!(statuses[0].is_in_stock);
    }

    #[tokio::test]
    async fn in_stock_order_is_stored_and_announced() {
        let fx = setup().await;
        let sub = fx.bus.subscribe();

        let order = fx.orders.place_order(vec![line("iphone_15", 2)]).await.unwrap();

        let stored = fx.order_repo.find_by_id(&order.id_typed()).await.unwrap();
        assert_eq!(stored.as_ref(), Some(&order));

        let env = sub.try_recv().expect("order.placed published");
        assert_eq!(env.event_type(), "order.placed");
        assert_eq!(env.aggregate_type(), ORDER_AGGREGATE_TYPE);
        assert_eq!(env.aggregate_id(), *order.id_typed().as_uuid());
        assert_eq!(env.payload()["orderNumber"], order.order_number());
    }

    #[tokio::test]
    async fn out_of_stock_and_unknown_skus_reject_the_order() {
        let fx = setup().await;
        let sub = fx.bus.subscribe();

        let err = fx
            .orders
            .place_order(vec![line("iphone_15", 1), line("iphone_15_pro", 1), line("pixel_8", 1)])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::OutOfStock(vec![sku("iphone_15_pro"), sku("pixel_8")])
        );
        assert_eq!(fx.order_repo.count().await.unwrap(), 0);
        assert!(sub.try_recv().is_err());
    }

    #[tokio::test]
    async fn restocking_makes_the_order_placeable() {
        let fx = setup().await;

        assert!(fx.orders.place_order(vec![line("iphone_15_pro", 1)]).await.is_err());
        fx.inventory.save_stock(sku("iphone_15_pro"), 10).await.unwrap();

        let order = fx.orders.place_order(vec![line("iphone_15_pro", 1)]).await.unwrap();
        assert_eq!(fx.orders.list_orders().await.unwrap(), vec![order.clone()]);
        assert_eq!(fx.orders.get_order(order.id_typed()).await.unwrap(), order);
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let fx = setup().await;
        assert_eq!(
            fx.orders.get_order(OrderId::new()).await.unwrap_err(),
            ServiceError::NotFound
        );
    }

    struct UnavailableInventory;

    #[async_trait]
    impl StockChecker for UnavailableInventory {
        async fn check_stock(&self, _sku_codes: &[SkuCode]) -> ServiceResult<Vec<StockStatus>> {
            Err(RepositoryError::Unavailable("inventory offline".to_string()).into())
        }
    }

    #[tokio::test]
    async fn stock_check_failures_propagate_without_storing() {
        let order_repo: Arc<InMemoryRepository<Order>> = Arc::new(InMemoryRepository::new());
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let orders = OrderService::new(order_repo.clone(), Arc::new(UnavailableInventory), bus);

        let err = orders.place_order(vec![line("iphone_15", 1)]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(RepositoryError::Unavailable(_))));
        assert_eq!(order_repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn products_are_created_listed_and_fetched() {
        let repo: Arc<InMemoryRepository<Product>> = Arc::new(InMemoryRepository::new());
        let products = ProductService::new(repo);

        let created = products
            .create_product(NewProduct {
                name: "iPhone 15".to_string(),
                description: "128 GB".to_string(),
                price: 79_900,
            })
            .await
            .unwrap();

        assert_eq!(products.list_products().await.unwrap(), vec![created.clone()]);
        assert_eq!(products.get_product(created.id_typed()).await.unwrap(), created);
        assert_eq!(
            products.get_product(ProductId::new()).await.unwrap_err(),
            ServiceError::NotFound
        );

        let invalid = products
            .create_product(NewProduct {
                name: " ".to_string(),
                description: String::new(),
                price: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(invalid, ServiceError::Domain(_)));
    }
}
