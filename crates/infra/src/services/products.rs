use std::sync::Arc;

use tracing::info;

use storefront_core::ProductId;
use storefront_products::{NewProduct, Product};

use crate::repository::ProductRepository;
use crate::services::{ServiceError, ServiceResult};

pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_product(&self, input: NewProduct) -> ServiceResult<Product> {
        let product = Product::create(ProductId::new(), input)?;
        let saved = self.repo.save(product).await?;
        info!(product_id = %saved.id_typed(), name = saved.name(), "product created");
        Ok(saved)
    }

    pub async fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        self.repo.find_by_id(&id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.repo.find_all().await?)
    }
}
