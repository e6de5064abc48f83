//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, password hashing, tokens) are implemented by
//! outbound adapters. Driving ports are implemented by the domain services
//! and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod order_command;
mod order_repository;
mod password_hasher;
mod product_catalogue;
mod product_repository;
mod token_service;
mod user_accounts;
mod user_repository;

pub use login_service::{LoginService, PrincipalResolver, RegistrationService};
pub use order_command::{
    OrderCommand, OrderLineRequest, OrderQuery, OrderUpdate, PlaceOrderRequest,
};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderPersistenceError, OrderRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use product_catalogue::{NewProduct, ProductCommand, ProductQuery, ProductUpdate};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductFilter, ProductPersistenceError, ProductRepository};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
pub use user_accounts::{UserAccountCommand, UserUpdate, UsersQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
