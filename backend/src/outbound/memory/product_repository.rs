use async_trait::async_trait;

use super::{InMemoryStore, newest_first};
use crate::domain::ports::{ProductFilter, ProductPersistenceError, ProductRepository};
use crate::domain::{Product, ProductId};

/// [`ProductRepository`] over the shared in-memory store.
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    store: InMemoryStore,
}

impl InMemoryProductRepository {
    pub(super) fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn matches(product: &Product, filter: &ProductFilter) -> bool {
    match filter {
        ProductFilter::All => true,
        ProductFilter::Category(category) => product.category() == Some(category.as_str()),
        ProductFilter::Search(term) => {
            let term = term.to_lowercase();
            product.name().to_lowercase().contains(&term)
                || product.description().to_lowercase().contains(&term)
        }
        ProductFilter::LowStock => product.is_low_stock(),
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &Product) -> Result<(), ProductPersistenceError> {
        let mut state = self.store.lock().map_err(ProductPersistenceError::connection)?;
        if state.products.contains_key(product.id()) {
            return Err(ProductPersistenceError::query(format!(
                "product {} already exists",
                product.id()
            )));
        }
        state.products.insert(*product.id(), product.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ProductId,
    ) -> Result<Option<Product>, ProductPersistenceError> {
        let state = self.store.lock().map_err(ProductPersistenceError::connection)?;
        Ok(state.products.get(id).cloned())
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError> {
        let state = self.store.lock().map_err(ProductPersistenceError::connection)?;
        let products = state
            .products
            .values()
            .filter(|product| matches(product, filter))
            .cloned()
            .collect();
        Ok(newest_first(products, |p| (p.created_at(), *p.id())))
    }

    async fn update(&self, product: &Product) -> Result<bool, ProductPersistenceError> {
        let mut state = self.store.lock().map_err(ProductPersistenceError::connection)?;
        match state.products.get_mut(product.id()) {
            Some(slot) => {
                *slot = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, ProductPersistenceError> {
        let mut state = self.store.lock().map_err(ProductPersistenceError::connection)?;
        Ok(state.products.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductChanges;
    use crate::test_support::{fixed_now, product};
    use rstest::rstest;

    async fn seeded() -> InMemoryProductRepository {
        let repo = InMemoryStore::new().products();
        let teapot = product("Teapot", 2_500, 10);
        let kettle = product("Kettle", 4_000, 2)
            .update_details(
                ProductChanges {
                    description: Some("Whistling stovetop kettle".to_owned()),
                    category: Some("kitchen".to_owned()),
                    ..ProductChanges::default()
                },
                fixed_now(),
            )
            .expect("kettle");
        let cup = product("Cup", 500, 5);
        for item in [teapot, kettle, cup] {
            repo.create(&item).await.expect("seed");
        }
        repo
    }

    fn names(products: Vec<Product>) -> Vec<String> {
        let mut names: Vec<String> = products.iter().map(|p| p.name().to_owned()).collect();
        names.sort();
        names
    }

    #[rstest]
    #[case::all(ProductFilter::All, &["Cup", "Kettle", "Teapot"])]
    #[case::category(ProductFilter::Category("kitchen".to_owned()), &["Kettle"])]
    #[case::search_name(ProductFilter::Search("TEA".to_owned()), &["Teapot"])]
    #[case::search_description(ProductFilter::Search("whistling".to_owned()), &["Kettle"])]
    #[case::low_stock(ProductFilter::LowStock, &["Cup", "Kettle"])]
    #[tokio::test]
    async fn list_applies_filter(#[case] filter: ProductFilter, #[case] expected: &[&str]) {
        let repo = seeded().await;
        let listed = repo.list(&filter).await.expect("list");
        assert_eq!(names(listed), expected);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = InMemoryStore::new().products();
        let ghost = product("Ghost", 100, 1);
        assert_eq!(repo.update(&ghost).await, Ok(false));
        assert_eq!(repo.delete(ghost.id()).await, Ok(false));
    }

    #[tokio::test]
    async fn update_replaces_stored_product() {
        let repo = InMemoryStore::new().products();
        let teapot = product("Teapot", 2_500, 10);
        repo.create(&teapot).await.expect("seed");

        let restocked = teapot.update_stock(40, fixed_now()).expect("stock");
        assert_eq!(repo.update(&restocked).await, Ok(true));

        let stored = repo.find_by_id(restocked.id()).await.expect("find");
        assert_eq!(stored.map(|p| p.stock()), Some(40));
    }
}
