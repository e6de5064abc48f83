//! Order placement, status changes and order reads.
//!
//! Placement checks every requested line against current stock before
//! anything is written, then hands the finished order to
//! [`OrderRepository::place`], which stores it and decrements stock in one
//! unit. A line that passes the early check but loses a race for the last
//! units still fails cleanly because the decrement is conditional.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::ports::{
    OrderCommand, OrderLineRequest, OrderQuery, OrderRepository, OrderUpdate, PlaceOrderRequest,
    ProductRepository,
};
use super::repository_errors::{map_order_error, map_product_error};
use super::{
    Error, Order, OrderDraft, OrderId, OrderItem, OrderItemDraft, OrderItemId, OrderStatus,
    OrderValidationError, Principal, ShippingAddress, ShippingAddressError,
};

fn invalid_order(err: OrderValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn invalid_address(err: ShippingAddressError) -> Error {
    Error::invalid_request(err.to_string())
}

fn order_not_found() -> Error {
    Error::not_found("Order not found")
}

/// Order service implementing the order command and query ports.
#[derive(Clone)]
pub struct OrderService<O, P> {
    orders: Arc<O>,
    products: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<O, P> OrderService<O, P> {
    pub fn new(orders: Arc<O>, products: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders,
            products,
            clock,
        }
    }
}

impl<O, P> OrderService<O, P>
where
    O: OrderRepository,
    P: ProductRepository,
{
    async fn load(&self, id: &OrderId) -> Result<Order, Error> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(order_not_found)
    }

    /// Check one requested line against stock and snapshot it as an item.
    async fn snapshot_line(
        &self,
        order_id: OrderId,
        line: &OrderLineRequest,
    ) -> Result<OrderItem, Error> {
        let product = self
            .products
            .find_by_id(&line.product_id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(format!("Product {} not found", line.product_id)))?;

        if i64::from(product.stock()) < line.quantity {
            return Err(Error::invalid_request(format!(
                "Insufficient stock for product {}",
                product.name()
            )));
        }

        OrderItem::new(OrderItemDraft {
            id: OrderItemId::random(),
            order_id,
            product_id: *product.id(),
            product_name: product.name().to_owned(),
            quantity: line.quantity,
            price: line.price.unwrap_or(product.price()),
        })
        .map_err(invalid_order)
    }

    fn apply_status(
        caller: &Principal,
        order: Order,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Order, Error> {
        if caller.is_admin() {
            return order.update_status(status, at).map_err(invalid_order);
        }
        if status != OrderStatus::Cancelled {
            return Err(Error::forbidden(format!(
                "Only administrators can change order status to {status}"
            )));
        }
        order.cancel(at).map_err(invalid_order)
    }
}

#[async_trait]
impl<O, P> OrderCommand for OrderService<O, P>
where
    O: OrderRepository,
    P: ProductRepository,
{
    async fn place_order(
        &self,
        caller: &Principal,
        request: PlaceOrderRequest,
    ) -> Result<Order, Error> {
        if request.items.is_empty() {
            return Err(invalid_order(OrderValidationError::EmptyItems));
        }
        if request.shipping_address.trim().is_empty() {
            return Err(Error::invalid_request("Shipping address is required"));
        }

        let order_id = OrderId::random();
        let mut items = Vec::with_capacity(request.items.len());
        let mut total = Decimal::ZERO;
        for line in &request.items {
            let item = self.snapshot_line(order_id, line).await?;
            total = total
                .checked_add(item.subtotal())
                .ok_or_else(|| invalid_order(OrderValidationError::TotalOutOfRange))?;
            items.push(item);
        }

        let shipping_address =
            ShippingAddress::parse(&request.shipping_address).map_err(invalid_address)?;
        let now = self.clock.utc();
        let order = Order::new(OrderDraft {
            id: order_id,
            user_id: *caller.user_id(),
            items,
            total_amount: total,
            status: OrderStatus::Pending,
            shipping_address,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
        .map_err(invalid_order)?;

        self.orders.place(&order).await.map_err(map_order_error)?;
        info!(
            order_id = %order.id(),
            user_id = %order.user_id(),
            total = %order.total_amount(),
            items = order.items().len(),
            "order placed"
        );
        Ok(order)
    }

    async fn update_order(
        &self,
        caller: &Principal,
        id: &OrderId,
        update: OrderUpdate,
    ) -> Result<Order, Error> {
        if update.status.is_none() && update.shipping_address.is_none() {
            return Err(Error::invalid_request("No order changes supplied"));
        }
        let mut order = self.load(id).await?;
        caller.require_access(order.user_id(), "You can only modify your own orders")?;

        let now = self.clock.utc();
        if let Some(status) = update.status {
            let from = order.status();
            order = Self::apply_status(caller, order, status, now)?;
            debug!(order_id = %id, %from, to = %status, "order status changed");
        }
        if let Some(raw) = update.shipping_address {
            let address = ShippingAddress::parse(&raw).map_err(invalid_address)?;
            order = order
                .with_shipping_address(address, now)
                .map_err(invalid_order)?;
        }

        let updated = self.orders.update(&order).await.map_err(map_order_error)?;
        if !updated {
            return Err(order_not_found());
        }
        Ok(order)
    }

    async fn delete_order(&self, caller: &Principal, id: &OrderId) -> Result<(), Error> {
        let order = self.load(id).await?;
        caller.require_access(order.user_id(), "You can only delete your own orders")?;
        let deleted = self.orders.delete(id).await.map_err(map_order_error)?;
        if !deleted {
            return Err(order_not_found());
        }
        info!(order_id = %id, "order deleted");
        Ok(())
    }
}

#[async_trait]
impl<O, P> OrderQuery for OrderService<O, P>
where
    O: OrderRepository,
    P: ProductRepository,
{
    async fn list_orders(&self, caller: &Principal) -> Result<Vec<Order>, Error> {
        let orders = if caller.is_admin() {
            self.orders.list_all().await
        } else {
            self.orders.list_for_user(caller.user_id()).await
        };
        orders.map_err(map_order_error)
    }

    async fn get_order(&self, caller: &Principal, id: &OrderId) -> Result<Order, Error> {
        let order = self.load(id).await?;
        caller.require_access(order.user_id(), "You can only view your own orders")?;
        Ok(order)
    }
}
