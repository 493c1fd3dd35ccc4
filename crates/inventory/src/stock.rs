use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, InventoryId, SkuCode};

/// A stored stock row: how many units of one SKU are on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    id: InventoryId,
    sku_code: SkuCode,
    quantity: i64,
}

impl Inventory {
    pub fn new(id: InventoryId, sku_code: SkuCode, quantity: i64) -> DomainResult<Self> {
        ensure_quantity(quantity)?;
        Ok(Self {
            id,
            sku_code,
            quantity,
        })
    }

    pub fn id_typed(&self) -> InventoryId {
        self.id
    }

    pub fn sku_code(&self) -> &SkuCode {
        &self.sku_code
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// A SKU is in stock iff its stored quantity is strictly positive.
    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Replace the on-hand quantity.
    pub fn set_quantity(&mut self, quantity: i64) -> DomainResult<()> {
        ensure_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }
}

impl Entity for Inventory {
    type Id = InventoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn ensure_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

/// Answer to "is this SKU in stock?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockStatus {
    pub sku_code: SkuCode,
    pub is_in_stock: bool,
}

impl From<&Inventory> for StockStatus {
    fn from(row: &Inventory) -> Self {
        Self {
            sku_code: row.sku_code.clone(),
            is_in_stock: row.is_in_stock(),
        }
    }
}

/// Map stored rows onto the requested SKUs.
///
/// - one entry per distinct requested SKU that has a stored row
/// - entries follow the order in which SKUs were first requested
/// - requested SKUs without a row produce no entry
/// - rows for SKUs that were not requested are ignored
pub fn stock_statuses(requested: &[SkuCode], rows: &[Inventory]) -> Vec<StockStatus> {
    let by_sku: HashMap<&SkuCode, &Inventory> = rows.iter().map(|r| (&r.sku_code, r)).collect();
    let mut seen: HashSet<&SkuCode> = HashSet::new();

    requested
        .iter()
        .filter(|sku| seen.insert(*sku))
        .filter_map(|sku| by_sku.get(sku).map(|row| StockStatus::from(*row)))
        .collect()
}
