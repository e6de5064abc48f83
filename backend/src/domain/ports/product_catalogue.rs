//! Driving ports for reading and maintaining the catalogue.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Error, Principal, Product, ProductChanges, ProductId};

use super::ProductFilter;

/// Fields accepted when creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub stock: i64,
    /// Falls back to the default threshold when absent.
    pub low_stock_threshold: Option<i64>,
}

/// Partial product update.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub changes: ProductChanges,
    pub stock: Option<i64>,
}

/// Public catalogue reads.
#[async_trait]
pub trait ProductQuery: Send + Sync {
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, Error>;

    async fn get_product(&self, id: &ProductId) -> Result<Product, Error>;
}

/// Administrator-only catalogue writes.
#[async_trait]
pub trait ProductCommand: Send + Sync {
    async fn create_product(&self, caller: &Principal, product: NewProduct)
    -> Result<Product, Error>;

    async fn update_product(
        &self,
        caller: &Principal,
        id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product, Error>;

    async fn delete_product(&self, caller: &Principal, id: &ProductId) -> Result<(), Error>;
}
