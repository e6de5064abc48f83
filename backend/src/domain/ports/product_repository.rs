//! Port abstraction for catalogue persistence.
use async_trait::async_trait;

use crate::domain::{Product, ProductId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by product repository adapters.
    pub enum ProductPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "product repository query failed: {message}",
    }
}

/// Which slice of the catalogue to list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProductFilter {
    #[default]
    All,
    /// Exact category match.
    Category(String),
    /// Case-insensitive substring of the name or description.
    Search(String),
    /// Products at or below their low-stock threshold.
    LowStock,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> Result<(), ProductPersistenceError>;

    async fn find_by_id(&self, id: &ProductId)
    -> Result<Option<Product>, ProductPersistenceError>;

    /// Products matching `filter`, newest first.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError>;

    /// Overwrite an existing product. Returns `false` when no row matched.
    async fn update(&self, product: &Product) -> Result<bool, ProductPersistenceError>;

    /// Remove a product. Returns `false` when no row matched.
    async fn delete(&self, id: &ProductId) -> Result<bool, ProductPersistenceError>;
}
