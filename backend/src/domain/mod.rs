//! Domain entities, services and ports.
//!
//! Purpose: hold the storefront's business rules free of HTTP and SQL.
//! Entities validate on construction and return new values on change;
//! services implement the driving ports in [`ports`] on top of the driven
//! ones.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failures.
//! - User, Product, Order (and friends): validated aggregates.
//! - AuthService, ProductCatalogueService, OrderService, UserAccountService:
//!   use-case implementations.

pub mod access;
pub mod auth;
pub mod auth_service;
pub mod error;
pub mod ids;
pub mod money;
pub mod order;
pub mod order_service;
pub mod ports;
pub mod product;
pub mod product_service;
mod repository_errors;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::access::Principal;
pub use self::auth::{
    AccessToken, AuthSession, LoginCredentials, LoginValidationError, MAX_PASSWORD_LEN,
    MIN_PASSWORD_LEN, Registration, RegistrationValidationError,
};
pub use self::auth_service::{AuthService, INVALID_CREDENTIALS};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{IdParseError, OrderId, OrderItemId, ProductId, UserId};
pub use self::money::{AmountError, MONEY_LIMIT, MONEY_SCALE};
pub use self::order::{
    ADDRESS_DELIMITER, Order, OrderDraft, OrderItem, OrderItemDraft, OrderStatus,
    OrderValidationError, ShippingAddress, ShippingAddressError, UnknownOrderStatus,
};
pub use self::order_service::OrderService;
pub use self::product::{
    DEFAULT_LOW_STOCK_THRESHOLD, Product, ProductChanges, ProductDraft, ProductValidationError,
};
pub use self::product_service::ProductCatalogueService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, PasswordHash, ProfileChanges, UnknownRole, User, UserDraft, UserRole,
    UserValidationError,
};
pub use self::user_service::UserAccountService;
