//! Startup data seeding.

use std::collections::HashSet;

use tracing::info;

use storefront_core::{InventoryId, SkuCode};
use storefront_inventory::{Inventory, SeedRow, default_seed};

use crate::repository::InventoryRepository;
use crate::services::ServiceResult;

/// Insert the default demo stock. See [`seed_rows`].
pub async fn seed_inventory(repo: &dyn InventoryRepository) -> ServiceResult<usize> {
    seed_rows(repo, default_seed()?).await
}

/// Insert `rows` whose SKU is not stored yet; existing rows keep their
/// quantity, so restarting against a persistent store changes nothing.
///
/// Returns the number of rows inserted.
pub async fn seed_rows(repo: &dyn InventoryRepository, rows: Vec<SeedRow>) -> ServiceResult<usize> {
    let wanted: Vec<SkuCode> = rows.iter().map(|r| r.sku_code.clone()).collect();
    let existing: HashSet<SkuCode> = repo
        .find_by_sku_code_in(&wanted)
        .await?
        .into_iter()
        .map(|row| row.sku_code().clone())
        .collect();

    let mut inserted = 0;
    for row in rows {
        if existing.contains(&row.sku_code) {
            continue;
        }
        let inventory = Inventory::new(InventoryId::new(), row.sku_code, row.quantity)?;
        repo.save(inventory).await?;
        inserted += 1;
    }

    info!(inserted, skipped = existing.len(), "inventory seeded");
    Ok(inserted)
}
