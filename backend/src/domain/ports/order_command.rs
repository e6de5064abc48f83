//! Driving ports for placing and maintaining orders.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Error, Order, OrderId, OrderStatus, Principal, ProductId};

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price to charge instead of the product's current price.
    pub price: Option<Decimal>,
}

/// Everything needed to place an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrderRequest {
    /// Comma-delimited address: street, city, state, zip code, country.
    pub shipping_address: String,
    pub notes: Option<String>,
    pub items: Vec<OrderLineRequest>,
}

/// Changes accepted for an existing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
}

#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Validate stock, build the order, persist it and decrement stock.
    async fn place_order(&self, caller: &Principal, request: PlaceOrderRequest)
    -> Result<Order, Error>;

    async fn update_order(
        &self,
        caller: &Principal,
        id: &OrderId,
        update: OrderUpdate,
    ) -> Result<Order, Error>;

    async fn delete_order(&self, caller: &Principal, id: &OrderId) -> Result<(), Error>;
}

#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// The caller's own orders, or every order for administrators.
    async fn list_orders(&self, caller: &Principal) -> Result<Vec<Order>, Error>;

    async fn get_order(&self, caller: &Principal, id: &OrderId) -> Result<Order, Error>;
}
