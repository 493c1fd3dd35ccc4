//! Postgres-backed repositories.
//!
//! Every query is parameterized; ids are stored as `UUID`, prices and
//! quantities as `BIGINT`. Orders and their line items are written in a single
//! transaction so a reader never observes a partially stored order.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use storefront_core::{InventoryId, OrderId, ProductId, SkuCode};
use storefront_inventory::Inventory;
use storefront_orders::{Order, OrderLineItem};
use storefront_products::Product;

use super::{
    CrudRepository, InventoryRepository, OrderRepository, ProductRepository, RepositoryError,
    RepositoryResult, map_sqlx_error,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        id UUID PRIMARY KEY,
        sku_code TEXT NOT NULL UNIQUE,
        quantity BIGINT NOT NULL CHECK (quantity >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        order_number TEXT NOT NULL UNIQUE,
        placed_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_line_items (
        order_id UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        line_no INTEGER NOT NULL,
        sku_code TEXT NOT NULL,
        price BIGINT NOT NULL CHECK (price >= 0),
        quantity BIGINT NOT NULL CHECK (quantity > 0),
        PRIMARY KEY (order_id, line_no)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        price BIGINT NOT NULL CHECK (price >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Create the storefront tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> RepositoryResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    debug!(tables = SCHEMA.len(), "storefront schema ensured");
    Ok(())
}

fn price_to_db(price: u64) -> RepositoryResult<i64> {
    i64::try_from(price)
        .map_err(|_| RepositoryError::Unrepresentable(format!("price {price} exceeds BIGINT range")))
}

fn price_from_db(price: i64) -> RepositoryResult<u64> {
    u64::try_from(price).map_err(|_| RepositoryError::Corrupt(format!("negative price {price}")))
}

fn sku_from_db(raw: String) -> RepositoryResult<SkuCode> {
    SkuCode::parse(&raw).map_err(|e| RepositoryError::Corrupt(format!("sku_code {raw:?}: {e}")))
}

// -------------------------
// Inventory
// -------------------------

/// Postgres repository for [`Inventory`] rows (`inventory` table).
#[derive(Debug, Clone)]
pub struct PostgresInventoryRepository {
    pool: PgPool,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn inventory_from_row(row: &PgRow) -> RepositoryResult<Inventory> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("inventory_row", e))?;
    let sku: String = row.try_get("sku_code").map_err(|e| map_sqlx_error("inventory_row", e))?;
    let quantity: i64 = row.try_get("quantity").map_err(|e| map_sqlx_error("inventory_row", e))?;

    Inventory::new(InventoryId::from_uuid(id), sku_from_db(sku)?, quantity)
        .map_err(|e| RepositoryError::Corrupt(e.to_string()))
}

#[async_trait]
impl CrudRepository<Inventory> for PostgresInventoryRepository {
    async fn save(&self, entity: Inventory) -> RepositoryResult<Inventory> {
        sqlx::query(
            r#"
            INSERT INTO inventory (id, sku_code, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                sku_code = EXCLUDED.sku_code,
                quantity = EXCLUDED.quantity
            "#,
        )
        .bind(entity.id_typed().as_uuid())
        .bind(entity.sku_code().as_str())
        .bind(entity.quantity())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_inventory", e))?;

        Ok(entity)
    }

    async fn find_by_id(&self, id: &InventoryId) -> RepositoryResult<Option<Inventory>> {
        let row = sqlx::query("SELECT id, sku_code, quantity FROM inventory WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_inventory", e))?;

        row.as_ref().map(inventory_from_row).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Inventory>> {
        let rows = sqlx::query("SELECT id, sku_code, quantity FROM inventory ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_inventory", e))?;

        rows.iter().map(inventory_from_row).collect()
    }

    async fn delete_by_id(&self, id: &InventoryId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_inventory", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) AS total FROM inventory", "count_inventory").await
    }
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn find_by_sku_code_in(&self, sku_codes: &[SkuCode]) -> RepositoryResult<Vec<Inventory>> {
        let codes: Vec<String> = sku_codes.iter().map(|s| s.as_str().to_string()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, sku_code, quantity
            FROM inventory
            WHERE sku_code = ANY($1)
            "#,
        )
        .bind(&codes)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_inventory_by_sku", e))?;

        rows.iter().map(inventory_from_row).collect()
    }
}

// -------------------------
// Orders
// -------------------------

/// Postgres repository for [`Order`]s (`orders` + `order_line_items`).
#[derive(Debug, Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_lines(&self, order_ids: &[Uuid]) -> RepositoryResult<HashMap<Uuid, Vec<OrderLineItem>>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, sku_code, price, quantity
            FROM order_line_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, line_no
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_order_lines", e))?;

        let mut out: HashMap<Uuid, Vec<OrderLineItem>> = HashMap::new();
        for row in &rows {
            let order_id: Uuid = row.try_get("order_id").map_err(|e| map_sqlx_error("order_line_row", e))?;
            let sku: String = row.try_get("sku_code").map_err(|e| map_sqlx_error("order_line_row", e))?;
            let price: i64 = row.try_get("price").map_err(|e| map_sqlx_error("order_line_row", e))?;
            let quantity: i64 = row.try_get("quantity").map_err(|e| map_sqlx_error("order_line_row", e))?;

            out.entry(order_id).or_default().push(OrderLineItem {
                sku_code: sku_from_db(sku)?,
                price: price_from_db(price)?,
                quantity,
            });
        }
        Ok(out)
    }

    async fn hydrate(&self, rows: Vec<PgRow>) -> RepositoryResult<Vec<Order>> {
        let mut headers: Vec<(Uuid, String, DateTime<Utc>)> = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("order_row", e))?;
            let number: String = row.try_get("order_number").map_err(|e| map_sqlx_error("order_row", e))?;
            let placed_at: DateTime<Utc> = row.try_get("placed_at").map_err(|e| map_sqlx_error("order_row", e))?;
            headers.push((id, number, placed_at));
        }

        let ids: Vec<Uuid> = headers.iter().map(|(id, _, _)| *id).collect();
        let mut lines = self.load_lines(&ids).await?;

        Ok(headers
            .into_iter()
            .map(|(id, number, placed_at)| {
                let items = lines.remove(&id).unwrap_or_default();
                Order::restore(OrderId::from_uuid(id), number, items, placed_at)
            })
            .collect())
    }
}

#[async_trait]
impl CrudRepository<Order> for PostgresOrderRepository {
    async fn save(&self, entity: Order) -> RepositoryResult<Order> {
        let order_id = *entity.id_typed().as_uuid();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("save_order", e))?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, placed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                order_number = EXCLUDED.order_number,
                placed_at = EXCLUDED.placed_at
            "#,
        )
        .bind(order_id)
        .bind(entity.order_number())
        .bind(entity.placed_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("save_order", e))?;

        sqlx::query("DELETE FROM order_line_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save_order_lines", e))?;

        for (line_no, line) in entity.line_items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (order_id, line_no, sku_code, price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(line_no as i32)
            .bind(line.sku_code.as_str())
            .bind(price_to_db(line.price)?)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save_order_lines", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("save_order", e))?;
        Ok(entity)
    }

    async fn find_by_id(&self, id: &OrderId) -> RepositoryResult<Option<Order>> {
        let rows = sqlx::query("SELECT id, order_number, placed_at FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_order", e))?;

        Ok(self.hydrate(rows).await?.into_iter().next())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Order>> {
        let rows = sqlx::query("SELECT id, order_number, placed_at FROM orders ORDER BY placed_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_orders", e))?;

        self.hydrate(rows).await
    }

    async fn delete_by_id(&self, id: &OrderId) -> RepositoryResult<bool> {
        // Line items go with the order (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) AS total FROM orders", "count_orders").await
    }
}

impl OrderRepository for PostgresOrderRepository {}

// -------------------------
// Products
// -------------------------

/// Postgres repository for [`Product`]s (`products` table).
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn product_from_row(row: &PgRow) -> RepositoryResult<Product> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("product_row", e))?;
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("product_row", e))?;
    let description: String = row.try_get("description").map_err(|e| map_sqlx_error("product_row", e))?;
    let price: i64 = row.try_get("price").map_err(|e| map_sqlx_error("product_row", e))?;

    Ok(Product::restore(ProductId::from_uuid(id), name, description, price_from_db(price)?))
}

#[async_trait]
impl CrudRepository<Product> for PostgresProductRepository {
    async fn save(&self, entity: Product) -> RepositoryResult<Product> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price
            "#,
        )
        .bind(entity.id_typed().as_uuid())
        .bind(entity.name())
        .bind(entity.description())
        .bind(price_to_db(entity.price())?)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_product", e))?;

        Ok(entity)
    }

    async fn find_by_id(&self, id: &ProductId) -> RepositoryResult<Option<Product>> {
        let row = sqlx::query("SELECT id, name, description, price FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, description, price FROM products ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    async fn delete_by_id(&self, id: &ProductId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) AS total FROM products", "count_products").await
    }
}

impl ProductRepository for PostgresProductRepository {}

async fn count_rows(pool: &PgPool, sql: &'static str, operation: &str) -> RepositoryResult<u64> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;

    let total: i64 = row.try_get("total").map_err(|e| map_sqlx_error(operation, e))?;
    u64::try_from(total).map_err(|_| RepositoryError::Corrupt(format!("negative count {total}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_beyond_bigint_are_unrepresentable() {
        assert_eq!(price_to_db(42).unwrap(), 42);
        assert!(matches!(
            price_to_db(u64::MAX),
            Err(RepositoryError::Unrepresentable(_))
        ));
    }

    #[test]
    fn negative_stored_prices_are_corrupt() {
        assert_eq!(price_from_db(7).unwrap(), 7);
        assert!(matches!(price_from_db(-1), Err(RepositoryError::Corrupt(_))));
    }

    #[test]
    fn blank_stored_skus_are_corrupt() {
        assert!(matches!(sku_from_db("  ".to_string()), Err(RepositoryError::Corrupt(_))));
        assert_eq!(sku_from_db("iphone_15".to_string()).unwrap().as_str(), "iphone_15");
    }
}
