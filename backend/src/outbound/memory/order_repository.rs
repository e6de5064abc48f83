use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{InMemoryStore, newest_first};
use crate::domain::ports::{OrderPersistenceError, OrderRepository};
use crate::domain::{Order, OrderId, ProductId, UserId};

/// [`OrderRepository`] over the shared in-memory store.
#[derive(Debug, Clone)]
pub struct InMemoryOrderRepository {
    store: InMemoryStore,
}

impl InMemoryOrderRepository {
    pub(super) fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

/// Total quantity requested per product across the order's lines.
fn requested_quantities(order: &Order) -> BTreeMap<ProductId, u32> {
    let mut totals = BTreeMap::new();
    for item in order.items() {
        let entry: &mut u32 = totals.entry(*item.product_id()).or_default();
        *entry = entry.saturating_add(item.quantity());
    }
    totals
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn place(&self, order: &Order) -> Result<(), OrderPersistenceError> {
        let mut state = self.store.lock().map_err(OrderPersistenceError::connection)?;
        if state.orders.contains_key(order.id()) {
            return Err(OrderPersistenceError::query(format!(
                "order {} already exists",
                order.id()
            )));
        }

        let mut restocked = Vec::new();
        for (product_id, quantity) in requested_quantities(order) {
            let reduced = state
                .products
                .get(&product_id)
                .cloned()
                .and_then(|product| product.reduce_stock(quantity, order.created_at()).ok())
                .ok_or_else(|| OrderPersistenceError::insufficient_stock(product_id))?;
            restocked.push(reduced);
        }

        for product in restocked {
            state.products.insert(*product.id(), product);
        }
        state.orders.insert(*order.id(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderPersistenceError> {
        let state = self.store.lock().map_err(OrderPersistenceError::connection)?;
        Ok(state.orders.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderPersistenceError> {
        let state = self.store.lock().map_err(OrderPersistenceError::connection)?;
        let orders = state
            .orders
            .values()
            .filter(|order| order.user_id() == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders, |o| (o.created_at(), *o.id())))
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError> {
        let state = self.store.lock().map_err(OrderPersistenceError::connection)?;
        let orders = state.orders.values().cloned().collect();
        Ok(newest_first(orders, |o| (o.created_at(), *o.id())))
    }

    async fn update(&self, order: &Order) -> Result<bool, OrderPersistenceError> {
        let mut state = self.store.lock().map_err(OrderPersistenceError::connection)?;
        match state.orders.get_mut(order.id()) {
            Some(slot) => {
                *slot = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, OrderPersistenceError> {
        let mut state = self.store.lock().map_err(OrderPersistenceError::connection)?;
        Ok(state.orders.remove(id).is_some())
    }
}
