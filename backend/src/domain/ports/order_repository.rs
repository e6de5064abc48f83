//! Port abstraction for order persistence, including atomic placement.
use async_trait::async_trait;

use crate::domain::{Order, OrderId, ProductId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// Stock ran out between validation and placement.
        InsufficientStock { product_id: ProductId } => "insufficient stock for product {product_id}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store an order with its items and take each item's quantity out of
    /// product stock, all or nothing.
    ///
    /// A decrement that would leave stock negative aborts the whole placement
    /// with `InsufficientStock`; nothing is written in that case.
    async fn place(&self, order: &Order) -> Result<(), OrderPersistenceError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderPersistenceError>;

    /// Orders belonging to `user_id`, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderPersistenceError>;

    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError>;

    /// Persist status, address, notes and timestamp changes. Items are
    /// immutable once placed. Returns `false` when no row matched.
    async fn update(&self, order: &Order) -> Result<bool, OrderPersistenceError>;

    /// Remove an order and its items. Returns `false` when no row matched.
    async fn delete(&self, id: &OrderId) -> Result<bool, OrderPersistenceError>;
}
