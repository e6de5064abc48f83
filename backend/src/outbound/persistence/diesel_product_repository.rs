//! PostgreSQL-backed [`ProductRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ProductFilter, ProductPersistenceError, ProductRepository};
use crate::domain::{Product, ProductDraft, ProductId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ProductChangeset, ProductRow};
use super::pool::DbPool;
use super::schema::products;

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn query_error(error: diesel::result::Error) -> ProductPersistenceError {
    map_diesel_error(
        error,
        ProductPersistenceError::query,
        ProductPersistenceError::connection,
    )
}

fn column_count(value: u32) -> Result<i32, ProductPersistenceError> {
    i32::try_from(value).map_err(|_| ProductPersistenceError::query("stock value out of range"))
}

/// `%term%` with LIKE wildcards in the term escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub(super) fn row_to_product(row: ProductRow) -> Result<Product, ProductPersistenceError> {
    let id = row.id;
    Product::new(ProductDraft {
        id: ProductId::from_uuid(row.id),
        name: row.name,
        description: row.description,
        price: row.price,
        image_url: row.image_url,
        category: row.category,
        stock: i64::from(row.stock),
        low_stock_threshold: i64::from(row.low_stock_threshold),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| {
        warn!(product_id = %id, error = %err, "stored product row is invalid");
        ProductPersistenceError::query("stored product row is invalid")
    })
}

fn product_to_row(product: &Product) -> Result<ProductRow, ProductPersistenceError> {
    Ok(ProductRow {
        id: *product.id().as_uuid(),
        name: product.name().to_owned(),
        description: product.description().to_owned(),
        price: product.price(),
        image_url: product.image_url().map(str::to_owned),
        category: product.category().map(str::to_owned),
        stock: column_count(product.stock())?,
        low_stock_threshold: column_count(product.low_stock_threshold())?,
        created_at: product.created_at(),
        updated_at: product.updated_at(),
    })
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn create(&self, product: &Product) -> Result<(), ProductPersistenceError> {
        let row = product_to_row(product)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProductPersistenceError::connection))?;
        diesel::insert_into(products::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ProductId,
    ) -> Result<Option<Product>, ProductPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProductPersistenceError::connection))?;
        products::table
            .find(*id.as_uuid())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error)?
            .map(row_to_product)
            .transpose()
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProductPersistenceError::connection))?;
        let mut query = products::table
            .select(ProductRow::as_select())
            .order((products::created_at.desc(), products::id.desc()))
            .into_boxed();
        query = match filter {
            ProductFilter::All => query,
            ProductFilter::Category(category) => {
                query.filter(products::category.eq(category.clone()))
            }
            ProductFilter::Search(term) => {
                let pattern = contains_pattern(term);
                query.filter(
                    products::name
                        .ilike(pattern.clone())
                        .or(products::description.ilike(pattern)),
                )
            }
            ProductFilter::LowStock => query.filter(products::stock.le(products::low_stock_threshold)),
        };
        let rows: Vec<ProductRow> = query.load(&mut conn).await.map_err(query_error)?;
        rows.into_iter().map(row_to_product).collect()
    }

    async fn update(&self, product: &Product) -> Result<bool, ProductPersistenceError> {
        let changes = ProductChangeset {
            name: product.name(),
            description: product.description(),
            price: product.price(),
            image_url: product.image_url(),
            category: product.category(),
            stock: column_count(product.stock())?,
            low_stock_threshold: column_count(product.low_stock_threshold())?,
            updated_at: product.updated_at(),
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProductPersistenceError::connection))?;
        let updated = diesel::update(products::table.find(*product.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(query_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, ProductPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ProductPersistenceError::connection))?;
        let deleted = diesel::delete(products::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(query_error)?;
        Ok(deleted > 0)
    }
}
