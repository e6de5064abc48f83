//! Order lines with their price and name snapshots.

use rust_decimal::Decimal;

use super::OrderValidationError;
use crate::domain::money::check_amount;
use crate::domain::{OrderId, OrderItemId, ProductId};

/// Unvalidated order line consumed by [`OrderItem::new`].
#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price: Decimal,
}

/// One line of an order.
///
/// `product_name` and `price` are copied from the product when the order is
/// placed so later catalogue edits leave history untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    quantity: u32,
    price: Decimal,
    subtotal: Decimal,
}

impl OrderItem {
    pub fn new(draft: OrderItemDraft) -> Result<Self, OrderValidationError> {
        if draft.quantity <= 0 {
            return Err(OrderValidationError::NonPositiveQuantity);
        }
        // Quantities are stored as INTEGER.
        let quantity = i32::try_from(draft.quantity)
            .map_err(|_| OrderValidationError::QuantityOutOfRange)?
            .unsigned_abs();
        if draft.price <= Decimal::ZERO {
            return Err(OrderValidationError::NonPositiveItemPrice);
        }
        check_amount(draft.price).map_err(OrderValidationError::ItemPrice)?;
        let subtotal = draft
            .price
            .checked_mul(Decimal::from(quantity))
            .ok_or(OrderValidationError::TotalOutOfRange)?;
        let product_name = draft.product_name.trim();
        if product_name.is_empty() {
            return Err(OrderValidationError::EmptyProductName);
        }
        Ok(Self {
            id: draft.id,
            order_id: draft.order_id,
            product_id: draft.product_id,
            product_name: product_name.to_owned(),
            quantity,
            price: draft.price,
            subtotal,
        })
    }

    pub fn id(&self) -> &OrderItemId {
        &self.id
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        self.product_name.as_str()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// `quantity × price`.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}
