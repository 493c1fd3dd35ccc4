//! Rows loaded into an empty inventory at startup.

use storefront_core::{DomainResult, SkuCode};

/// A SKU and the quantity it starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRow {
    pub sku_code: SkuCode,
    pub quantity: i64,
}

/// Demo stock: one SKU available, one sold out.
pub fn default_seed() -> DomainResult<Vec<SeedRow>> {
    Ok(vec![
        SeedRow {
            sku_code: SkuCode::parse("iphone_15")?,
            quantity: 100,
        },
        SeedRow {
            sku_code: SkuCode::parse("iphone_15_pro")?,
            quantity: 0,
        },
    ])
}
