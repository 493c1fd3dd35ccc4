use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_core::{DomainError, DomainResult, Entity, OrderId, SkuCode};
use storefront_events::Event;

/// Order line: SKU, unit price, quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub sku_code: SkuCode,
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
    pub quantity: i64,
}

impl OrderLineItem {
    pub fn new(sku_code: SkuCode, price: u64, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "quantity for {sku_code} must be greater than zero"
            )));
        }
        Ok(Self {
            sku_code,
            price,
            quantity,
        })
    }

    /// `price * quantity`, or `None` on overflow.
    pub fn subtotal(&self) -> Option<u64> {
        u64::try_from(self.quantity)
            .ok()
            .and_then(|q| self.price.checked_mul(q))
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: String,
    line_items: Vec<OrderLineItem>,
    placed_at: DateTime<Utc>,
}

impl Order {
    /// Build a new order from its lines.
    ///
    /// A fresh order number is assigned; callers that need determinism
    /// use [`Order::restore`].
    pub fn place(line_items: Vec<OrderLineItem>, placed_at: DateTime<Utc>) -> DomainResult<Self> {
        if line_items.is_empty() {
            return Err(DomainError::validation("order must contain at least one line item"));
        }
        for line in &line_items {
            if line.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity for {} must be greater than zero",
                    line.sku_code
                )));
            }
        }

        let order = Self {
            id: OrderId::new(),
            order_number: Uuid::now_v7().to_string(),
            line_items,
            placed_at,
        };
        order.total()?;
        Ok(order)
    }

    /// Rehydrate an order from storage (no validation; storage only holds
    /// orders that were valid when placed).
    pub fn restore(
        id: OrderId,
        order_number: String,
        line_items: Vec<OrderLineItem>,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_number,
            line_items,
            placed_at,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Distinct SKUs referenced by this order, in first-seen order.
    pub fn sku_codes(&self) -> Vec<SkuCode> {
        let mut out: Vec<SkuCode> = Vec::with_capacity(self.line_items.len());
        for line in &self.line_items {
            if !out.contains(&line.sku_code) {
                out.push(line.sku_code.clone());
            }
        }
        out
    }

    /// Order total in minor units.
    pub fn total(&self) -> DomainResult<u64> {
        self.line_items.iter().try_fold(0u64, |acc, line| {
            line.subtotal()
                .and_then(|s| acc.checked_add(s))
                .ok_or_else(|| DomainError::invariant("order total overflows"))
        })
    }

    /// The notification emitted once this order is persisted.
    pub fn placed_event(&self) -> OrderPlaced {
        OrderPlaced {
            order_id: self.id,
            order_number: self.order_number.clone(),
            sku_codes: self.sku_codes(),
            occurred_at: self.placed_at,
        }
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub order_number: String,
    pub sku_codes: Vec<SkuCode>,
    pub occurred_at: DateTime<Utc>,
}

impl Event for OrderPlaced {
    fn event_type(&self) -> &'static str {
        "order.placed"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sku(s: &str) -> SkuCode {
        SkuCode::parse(s).unwrap()
    }

    fn line(s: &str, price: u64, quantity: i64) -> OrderLineItem {
        OrderLineItem::new(sku(s), price, quantity).unwrap()
    }

    #[test]
    fn place_assigns_id_and_order_number() {
        let order = Order::place(vec![line("iphone_15", 120_000, 1)], Utc::now()).unwrap();
        assert!(!order.order_number().is_empty());
        assert!(Uuid::parse_str(order.order_number()).is_ok());
        assert_eq!(order.line_items().len(), 1);
    }

    #[test]
    fn empty_orders_are_rejected() {
        let err = Order::place(vec![], Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        assert!(OrderLineItem::new(sku("a"), 1, 0).is_err());
        assert!(OrderLineItem::new(sku("a"), 1, -2).is_err());

        // Lines built by hand (e.g. deserialized) are re-checked on place.
        let raw = OrderLineItem { sku_code: sku("a"), price: 1, quantity: 0 };
        assert!(Order::place(vec![raw], Utc::now()).is_err());
    }

    #[test]
    fn total_sums_line_subtotals() {
        let order = Order::place(
            vec![line("a", 250, 2), line("b", 1_000, 3)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(order.total().unwrap(), 3_500);
    }

    #[test]
    fn overflowing_total_is_an_invariant_violation() {
        let err = Order::place(vec![line("a", u64::MAX, 2)], Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn placed_event_lists_each_sku_once() {
        let order = Order::place(
            vec![line("a", 1, 1), line("b", 1, 1), line("a", 1, 4)],
            Utc::now(),
        )
        .unwrap();

        let event = order.placed_event();
        assert_eq!(event.event_type(), "order.placed");
        assert_eq!(event.order_id, order.id_typed());
        assert_eq!(event.sku_codes, vec![sku("a"), sku("b")]);
        assert_eq!(event.occurred_at, order.placed_at());
    }

    #[test]
    fn placed_event_serializes_camel_case() {
        let order = Order::place(vec![line("iphone_15", 1, 1)], Utc::now()).unwrap();
        let json = serde_json::to_value(order.placed_event()).unwrap();

        assert_eq!(json["orderId"], order.id_typed().to_string());
        assert_eq!(json["orderNumber"], order.order_number());
        assert_eq!(json["skuCodes"], serde_json::json!(["iphone_15"]));
        assert!(json.get("occurredAt").is_some());
        assert!(json.get("order_number").is_none());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: total equals the sum of price * quantity when it fits.
            #[test]
            fn total_matches_naive_sum(
                lines in proptest::collection::vec((0u64..10_000, 1i64..100), 1..10)
            ) {
                let items: Vec<OrderLineItem> = lines
                    .iter()
                    .enumerate()
                    .map(|(i, (p, q))| line(&format!("sku_{i}"), *p, *q))
                    .collect();
                let expected: u64 = lines.iter().map(|(p, q)| p * (*q as u64)).sum();

                let order = Order::place(items, Utc::now()).unwrap();
                prop_assert_eq!(order.total().unwrap(), expected);
            }
        }
    }
}
