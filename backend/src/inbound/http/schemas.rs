//! JSON representations of domain aggregates returned by the API.
//!
//! Domain types stay free of wire concerns; these structs add the derived
//! fields clients expect (`isLowStock`, `totalQuantity`, `fullName`) and
//! leave out what must never leave the service, such as password hashes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Order, OrderItem, OrderStatus, Product, ShippingAddress, User, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 19.99)]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub stock: u32,
    pub low_stock_threshold: u32,
    pub is_low_stock: bool,
    pub is_in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: *product.id().as_uuid(),
            name: product.name().to_owned(),
            description: product.description().to_owned(),
            price: product.price(),
            image_url: product.image_url().map(str::to_owned),
            category: product.category().map(str::to_owned),
            stock: product.stock(),
            low_stock_threshold: product.low_stock_threshold(),
            is_low_stock: product.is_low_stock(),
            is_in_stock: product.is_in_stock(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressResponse {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl From<&ShippingAddress> for ShippingAddressResponse {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            street: address.street().to_owned(),
            city: address.city().to_owned(),
            state: address.state().to_owned(),
            zip_code: address.zip_code().to_owned(),
            country: address.country().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: *item.id().as_uuid(),
            product_id: *item.product_id().as_uuid(),
            product_name: item.product_name().to_owned(),
            quantity: item.quantity(),
            price: item.price(),
            subtotal: item.subtotal(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemResponse>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 25.0)]
    pub total_amount: Decimal,
    pub total_quantity: u64,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddressResponse,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: *order.id().as_uuid(),
            user_id: *order.user_id().as_uuid(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            total_amount: order.total_amount(),
            total_quantity: order.total_quantity(),
            status: order.status(),
            shipping_address: ShippingAddressResponse::from(order.shipping_address()),
            notes: order.notes().map(str::to_owned),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

/// A user account as seen by clients. Carries no credential material.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            email: user.email().as_str().to_owned(),
            first_name: user.first_name().to_owned(),
            last_name: user.last_name().to_owned(),
            full_name: user.full_name(),
            role: user.role(),
            is_admin: user.is_admin(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Confirmation returned by delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Order deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
