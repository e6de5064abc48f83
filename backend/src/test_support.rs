//! Shared fixtures for unit tests across the crate.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rust_decimal::Decimal;

use crate::domain::{
    Email, Order, OrderDraft, OrderId, OrderItem, OrderItemDraft, OrderItemId, OrderStatus,
    PasswordHash, Principal, Product, ProductDraft, ProductId, ShippingAddress, User, UserDraft,
    UserId, UserRole,
};

pub const ADDRESS: &str = "1 Main St, Springfield, IL, 62701, US";

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self::at(fixed_now())
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub fn user(email: &str, role: UserRole) -> User {
    User::new(UserDraft {
        id: UserId::random(),
        email: Email::parse(email).expect("fixture email"),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        password_hash: PasswordHash::new("hashed:correct horse").expect("fixture hash"),
        role,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    })
    .expect("fixture user")
}

pub fn principal_for(user: &User) -> Principal {
    Principal::new(*user.id(), user.email().clone(), user.role())
}

pub fn customer() -> Principal {
    principal_for(&user("customer@example.com", UserRole::Customer))
}

pub fn admin() -> Principal {
    principal_for(&user("admin@example.com", UserRole::Admin))
}

/// Product priced in cents with the given stock.
pub fn product(name: &str, price_cents: i64, stock: i64) -> Product {
    Product::new(ProductDraft {
        id: ProductId::random(),
        name: name.to_owned(),
        description: format!("{name} description"),
        price: Decimal::new(price_cents, 2),
        image_url: None,
        category: Some("general".to_owned()),
        stock,
        low_stock_threshold: 5,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    })
    .expect("fixture product")
}

/// Pending order for `owner` buying `quantity` of each product at its
/// current price.
pub fn order(owner: &UserId, lines: &[(&Product, i64)]) -> Order {
    let id = OrderId::random();
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(product, quantity)| {
            OrderItem::new(OrderItemDraft {
                id: OrderItemId::random(),
                order_id: id,
                product_id: *product.id(),
                product_name: product.name().to_owned(),
                quantity: *quantity,
                price: product.price(),
            })
            .expect("fixture item")
        })
        .collect();
    let total_amount = items.iter().map(OrderItem::subtotal).sum();
    Order::new(OrderDraft {
        id,
        user_id: *owner,
        items,
        total_amount,
        status: OrderStatus::Pending,
        shipping_address: ShippingAddress::parse(ADDRESS).expect("fixture address"),
        notes: None,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    })
    .expect("fixture order")
}
