use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use storefront_core::{InventoryId, SkuCode};
use storefront_inventory::{Inventory, StockStatus, stock_statuses};

use crate::repository::InventoryRepository;
use crate::services::ServiceResult;

/// Answers "which of these SKUs are in stock?".
///
/// The order service depends on this seam rather than on [`InventoryService`]
/// directly, so stock can be checked in-process or against a remote inventory.
#[async_trait]
pub trait StockChecker: Send + Sync {
    async fn check_stock(&self, sku_codes: &[SkuCode]) -> ServiceResult<Vec<StockStatus>>;
}

pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        Self { repo }
    }

    /// Read-only stock lookup.
    ///
    /// One entry per distinct requested SKU that has a stored row, in request
    /// order; unknown SKUs are omitted.
    pub async fn is_in_stock(&self, sku_codes: &[SkuCode]) -> ServiceResult<Vec<StockStatus>> {
        if sku_codes.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.repo.find_by_sku_code_in(sku_codes).await?;
        let statuses = stock_statuses(sku_codes, &rows);
        debug!(
            requested = sku_codes.len(),
            found = statuses.len(),
            "stock lookup"
        );
        Ok(statuses)
    }

    /// Set the on-hand quantity for a SKU, creating the row if needed.
    pub async fn save_stock(&self, sku_code: SkuCode, quantity: i64) -> ServiceResult<Inventory> {
        let existing = self
            .repo
            .find_by_sku_code_in(std::slice::from_ref(&sku_code))
            .await?
            .into_iter()
            .next();

        let row = match existing {
            Some(mut row) => {
                row.set_quantity(quantity)?;
                row
            }
            None => Inventory::new(InventoryId::new(), sku_code, quantity)?,
        };

        let saved = self.repo.save(row).await?;
        info!(sku = %saved.sku_code(), quantity = saved.quantity(), "stock saved");
        Ok(saved)
    }
}

#[async_trait]
impl StockChecker for InventoryService {
    async fn check_stock(&self, sku_codes: &[SkuCode]) -> ServiceResult<Vec<StockStatus>> {
        self.is_in_stock(sku_codes).await
    }
}
