//! In-process repositories used when no database is configured.
//!
//! All three repositories share one [`InMemoryStore`] so order placement can
//! check and decrement product stock under a single lock, mirroring the
//! transaction the Diesel adapter runs.

mod order_repository;
mod product_repository;
mod user_repository;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{Order, OrderId, Product, ProductId, User, UserId};

pub use order_repository::InMemoryOrderRepository;
pub use product_repository::InMemoryProductRepository;
pub use user_repository::InMemoryUserRepository;

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
}

/// Shared backing store for the in-memory repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository::new(self.clone())
    }

    pub fn products(&self) -> InMemoryProductRepository {
        InMemoryProductRepository::new(self.clone())
    }

    pub fn orders(&self) -> InMemoryOrderRepository {
        InMemoryOrderRepository::new(self.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, &'static str> {
        self.state.lock().map_err(|_| POISONED)
    }
}

/// Sort newest first, falling back to id order for identical timestamps.
fn newest_first<T, K: Ord>(
    mut rows: Vec<T>,
    key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, K),
) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}
