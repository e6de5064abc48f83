//! Orders, their lines and their lifecycle.
//!
//! An [`Order`] is rebuilt on every change. Status moves follow the
//! [`OrderStatus`] state machine; who may request a move is decided by the
//! order services, not here.

mod address;
mod item;
mod status;

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub use self::address::{ADDRESS_DELIMITER, ShippingAddress, ShippingAddressError};
pub use self::item::{OrderItem, OrderItemDraft};
pub use self::status::{OrderStatus, UnknownOrderStatus};
use super::money::{AmountError, check_amount};
use super::{OrderId, UserId};

/// Validation errors raised while building or changing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    EmptyItems,
    NonPositiveTotal,
    TotalMismatch { expected: Decimal, actual: Decimal },
    ForeignItem,
    NonPositiveQuantity,
    QuantityOutOfRange,
    NonPositiveItemPrice,
    ItemPrice(AmountError),
    TotalOutOfRange,
    EmptyProductName,
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    NotCancellable { status: OrderStatus },
    AddressLocked { status: OrderStatus },
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyItems => write!(f, "order must contain at least one item"),
            Self::NonPositiveTotal => write!(f, "order total must be greater than zero"),
            Self::TotalMismatch { expected, actual } => write!(
                f,
                "order total {actual} does not match item subtotals {expected}"
            ),
            Self::ForeignItem => write!(f, "order item belongs to another order"),
            Self::NonPositiveQuantity => write!(f, "quantity must be greater than zero"),
            Self::QuantityOutOfRange => write!(f, "quantity is out of range"),
            Self::NonPositiveItemPrice => write!(f, "item price must be greater than zero"),
            Self::ItemPrice(err) => write!(f, "item price {err}"),
            Self::TotalOutOfRange => write!(f, "order total is out of range"),
            Self::EmptyProductName => write!(f, "product name must not be empty"),
            Self::InvalidTransition { from, to } => {
                write!(f, "cannot change order status from {from} to {to}")
            }
            Self::NotCancellable { status } => {
                write!(f, "order cannot be cancelled once {status}")
            }
            Self::AddressLocked { status } => write!(
                f,
                "shipping address cannot be changed once the order is {status}"
            ),
        }
    }
}

impl std::error::Error for OrderValidationError {}

/// Unvalidated order fields consumed by [`Order::new`].
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer's order.
///
/// ## Invariants
/// - At least one item, each belonging to this order.
/// - `total_amount` is positive, equals the sum of item subtotals and fits
///   a money column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<OrderItem>,
    total_amount: Decimal,
    status: OrderStatus,
    shipping_address: ShippingAddress,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Validate a draft into an order.
    pub fn new(draft: OrderDraft) -> Result<Self, OrderValidationError> {
        if draft.items.is_empty() {
            return Err(OrderValidationError::EmptyItems);
        }
        if draft.total_amount <= Decimal::ZERO {
            return Err(OrderValidationError::NonPositiveTotal);
        }
        if draft.items.iter().any(|item| item.order_id() != &draft.id) {
            return Err(OrderValidationError::ForeignItem);
        }
        let expected =
            sum_subtotals(&draft.items).ok_or(OrderValidationError::TotalOutOfRange)?;
        if check_amount(expected).is_err() {
            return Err(OrderValidationError::TotalOutOfRange);
        }
        if expected != draft.total_amount {
            return Err(OrderValidationError::TotalMismatch {
                expected,
                actual: draft.total_amount,
            });
        }
        Ok(Self {
            id: draft.id,
            user_id: draft.user_id,
            items: draft.items,
            total_amount: draft.total_amount,
            status: draft.status,
            shipping_address: draft.shipping_address,
            notes: draft
                .notes
                .map(|notes| notes.trim().to_owned())
                .filter(|notes| !notes.is_empty()),
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sum of the item subtotals, or `None` on overflow.
    pub fn calculate_total(&self) -> Option<Decimal> {
        sum_subtotals(&self.items)
    }

    /// Number of units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn can_be_cancelled(&self) -> bool {
        self.status.is_cancellable()
    }

    /// Move the order to `next` if the lifecycle allows it.
    pub fn update_status(
        self,
        next: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Self, OrderValidationError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderValidationError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        Ok(Self {
            status: next,
            updated_at: at,
            ..self
        })
    }

    /// Cancel a pending or confirmed order.
    pub fn cancel(self, at: DateTime<Utc>) -> Result<Self, OrderValidationError> {
        if !self.can_be_cancelled() {
            return Err(OrderValidationError::NotCancellable {
                status: self.status,
            });
        }
        self.update_status(OrderStatus::Cancelled, at)
    }

    /// Replace the shipping address while the order is still pending.
    pub fn with_shipping_address(
        self,
        address: ShippingAddress,
        at: DateTime<Utc>,
    ) -> Result<Self, OrderValidationError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderValidationError::AddressLocked {
                status: self.status,
            });
        }
        Ok(Self {
            shipping_address: address,
            updated_at: at,
            ..self
        })
    }
}

fn sum_subtotals(items: &[OrderItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.subtotal()))
}

#[cfg(test)]
mod tests;
