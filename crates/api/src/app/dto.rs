use serde::{Deserialize, Serialize};

use storefront_core::{DomainResult, SkuCode};
use storefront_inventory::Inventory;
use storefront_orders::{Order, OrderLineItem};
use storefront_products::{NewProduct, Product};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SaveStockRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemDto {
    pub sku_code: String,
    pub price: u64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(alias = "orderLineItems")]
    pub order_line_items_dto_list: Vec<OrderLineItemDto>,
}

impl PlaceOrderRequest {
    pub fn into_line_items(self) -> DomainResult<Vec<OrderLineItem>> {
        self.order_line_items_dto_list
            .into_iter()
            .map(|l| OrderLineItem::new(SkuCode::parse(&l.sku_code)?, l.price, l.quantity))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        NewProduct {
            name: req.name,
            description: req.description,
            price: req.price,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedResponse {
    pub order_id: String,
    pub order_number: String,
    pub message: &'static str,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn inventory_to_json(row: &Inventory) -> serde_json::Value {
    serde_json::json!({
        "id": row.id_typed().to_string(),
        "skuCode": row.sku_code(),
        "quantity": row.quantity(),
        "isInStock": row.is_in_stock(),
    })
}

pub fn order_to_json(order: &Order) -> serde_json::Value {
    serde_json::json!({
        "id": order.id_typed().to_string(),
        "orderNumber": order.order_number(),
        "placedAt": order.placed_at().to_rfc3339(),
        "total": order.total().ok(),
        "orderLineItems": order.line_items().iter().map(|l| serde_json::json!({
            "skuCode": l.sku_code,
            "price": l.price,
            "quantity": l.quantity,
        })).collect::<Vec<_>>(),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id_typed().to_string(),
        "name": product.name(),
        "description": product.description(),
        "price": product.price(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_request_accepts_both_field_names() {
        let body = r#"{"orderLineItemsDtoList":[{"skuCode":"iphone_15","price":1000,"quantity":1}]}"#;
        let req: PlaceOrderRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.order_line_items_dto_list.len(), 1);

        let body = r#"{"orderLineItems":[{"skuCode":"iphone_15","price":1000,"quantity":2}]}"#;
        let req: PlaceOrderRequest = serde_json::from_str(body).unwrap();
        let lines = req.into_line_items().unwrap();
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn blank_sku_in_order_line_is_a_validation_error() {
        let body = r#"{"orderLineItemsDtoList":[{"skuCode":" ","price":1,"quantity":1}]}"#;
        let req: PlaceOrderRequest = serde_json::from_str(body).unwrap();
        assert!(req.into_line_items().is_err());
    }
}
