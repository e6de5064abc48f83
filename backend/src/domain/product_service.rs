//! Catalogue reads for everyone and catalogue writes for administrators.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::ports::{
    NewProduct, ProductCommand, ProductFilter, ProductQuery, ProductRepository, ProductUpdate,
};
use super::repository_errors::map_product_error;
use super::{
    DEFAULT_LOW_STOCK_THRESHOLD, Error, Principal, Product, ProductDraft, ProductId,
    ProductValidationError,
};

const ADMIN_ONLY: &str = "Only administrators can manage products";

fn invalid_product(err: ProductValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn product_not_found() -> Error {
    Error::not_found("Product not found")
}

/// Product service implementing the catalogue query and command ports.
#[derive(Clone)]
pub struct ProductCatalogueService<P> {
    products: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> ProductCatalogueService<P> {
    pub fn new(products: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { products, clock }
    }
}

impl<P> ProductCatalogueService<P>
where
    P: ProductRepository,
{
    async fn load(&self, id: &ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(product_not_found)
    }
}

#[async_trait]
impl<P> ProductQuery for ProductCatalogueService<P>
where
    P: ProductRepository,
{
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, Error> {
        self.products.list(filter).await.map_err(map_product_error)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, Error> {
        self.load(id).await
    }
}

#[async_trait]
impl<P> ProductCommand for ProductCatalogueService<P>
where
    P: ProductRepository,
{
    async fn create_product(
        &self,
        caller: &Principal,
        product: NewProduct,
    ) -> Result<Product, Error> {
        caller.require_admin(ADMIN_ONLY)?;
        let now = self.clock.utc();
        let product = Product::new(ProductDraft {
            id: ProductId::random(),
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
            category: product.category,
            stock: product.stock,
            low_stock_threshold: product
                .low_stock_threshold
                .unwrap_or(i64::from(DEFAULT_LOW_STOCK_THRESHOLD)),
            created_at: now,
            updated_at: now,
        })
        .map_err(invalid_product)?;

        self.products
            .create(&product)
            .await
            .map_err(map_product_error)?;
        info!(product_id = %product.id(), "product created");
        Ok(product)
    }

    async fn update_product(
        &self,
        caller: &Principal,
        id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product, Error> {
        caller.require_admin(ADMIN_ONLY)?;
        let now = self.clock.utc();
        let mut product = self
            .load(id)
            .await?
            .update_details(update.changes, now)
            .map_err(invalid_product)?;
        if let Some(stock) = update.stock {
            product = product.update_stock(stock, now).map_err(invalid_product)?;
        }

        let updated = self
            .products
            .update(&product)
            .await
            .map_err(map_product_error)?;
        if !updated {
            return Err(product_not_found());
        }
        Ok(product)
    }

    async fn delete_product(&self, caller: &Principal, id: &ProductId) -> Result<(), Error> {
        caller.require_admin(ADMIN_ONLY)?;
        let deleted = self
            .products
            .delete(id)
            .await
            .map_err(map_product_error)?;
        if !deleted {
            return Err(product_not_found());
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }
}
