//! HTTP inbound adapter exposing the storefront REST API under `/api/v1`.

pub mod auth;
pub mod bearer;
pub mod error;
pub mod health;
pub mod orders;
pub mod products;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Prefix shared by every API route.
pub const API_PREFIX: &str = "/api/v1";

/// Every API route under [`API_PREFIX`].
pub fn api_scope() -> Scope {
    web::scope(API_PREFIX)
        .service(auth::login)
        .service(auth::register)
        .service(products::list_products)
        .service(products::get_product)
        .service(products::create_product)
        .service(products::update_product)
        .service(products::delete_product)
        .service(orders::list_orders)
        .service(orders::get_order)
        .service(orders::place_order)
        .service(orders::update_order)
        .service(orders::delete_order)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
}
