use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use storefront_core::{OrderId, SkuCode};
use storefront_events::{EventBus, EventEnvelope};
use storefront_orders::{Order, OrderLineItem};

use crate::repository::OrderRepository;
use crate::services::{ServiceError, ServiceResult, StockChecker};

/// `aggregate_type` stamped on order envelopes.
pub const ORDER_AGGREGATE_TYPE: &str = "order";

pub struct OrderService<B>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    repo: Arc<dyn OrderRepository>,
    stock: Arc<dyn StockChecker>,
    bus: B,
}

impl<B> OrderService<B>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn new(repo: Arc<dyn OrderRepository>, stock: Arc<dyn StockChecker>, bus: B) -> Self {
        Self { repo, stock, bus }
    }

    /// Place an order if every SKU on it is in stock.
    ///
    /// A SKU with no inventory row counts as out of stock. Stock is checked,
    /// not reserved. The `order.placed` notification is published after the
    /// order is stored; a publish failure is logged and does not fail the call.
    pub async fn place_order(&self, line_items: Vec<OrderLineItem>) -> ServiceResult<Order> {
        let order = Order::place(line_items, Utc::now())?;
        let skus = order.sku_codes();

        let statuses = self.stock.check_stock(&skus).await?;
        let missing: Vec<SkuCode> = skus
            .into_iter()
            .filter(|sku| {
                !statuses
                    .iter()
                    .any(|s| &s.sku_code == sku && s.is_in_stock)
            })
            .collect();

        if !missing.is_empty() {
            warn!(skus = ?missing, "order rejected: products not in stock");
            return Err(ServiceError::OutOfStock(missing));
        }

        let saved = self.repo.save(order).await?;

        match EventEnvelope::from_typed(
            *saved.id_typed().as_uuid(),
            ORDER_AGGREGATE_TYPE,
            &saved.placed_event(),
        ) {
            Ok(env) => {
                if let Err(e) = self.bus.publish(env) {
                    warn!(order_number = saved.order_number(), "order.placed publish failed: {e:?}");
                }
            }
            Err(e) => warn!(order_number = saved.order_number(), "order.placed not published: {e}"),
        }

        info!(
            order_id = %saved.id_typed(),
            order_number = saved.order_number(),
            lines = saved.line_items().len(),
            "order placed"
        );
        Ok(saved)
    }

    pub async fn get_order(&self, id: OrderId) -> ServiceResult<Order> {
        self.repo.find_by_id(&id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn list_orders(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.repo.find_all().await?)
    }
}
