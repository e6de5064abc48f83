//! Translation of driven-port failures into domain errors.
//!
//! Connection failures surface as `503` so clients can retry; anything else
//! is an internal error whose details stay in the logs.

use tracing::error;

use super::Error;
use super::ports::{OrderPersistenceError, ProductPersistenceError, UserPersistenceError};

pub(crate) fn map_user_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => unavailable("user", &message),
        UserPersistenceError::Query { message } => query_failed("user", &message),
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("User with this email already exists")
        }
    }
}

pub(crate) fn map_product_error(err: ProductPersistenceError) -> Error {
    match err {
        ProductPersistenceError::Connection { message } => unavailable("product", &message),
        ProductPersistenceError::Query { message } => query_failed("product", &message),
    }
}

pub(crate) fn map_order_error(err: OrderPersistenceError) -> Error {
    match err {
        OrderPersistenceError::Connection { message } => unavailable("order", &message),
        OrderPersistenceError::Query { message } => query_failed("order", &message),
        OrderPersistenceError::InsufficientStock { product_id } => {
            Error::invalid_request(format!("Insufficient stock for product {product_id}"))
        }
    }
}

fn unavailable(repository: &str, message: &str) -> Error {
    error!(repository, %message, "repository connection failed");
    Error::service_unavailable(format!("{repository} repository unavailable"))
}

fn query_failed(repository: &str, message: &str) -> Error {
    error!(repository, %message, "repository query failed");
    Error::internal(format!("{repository} repository error: {message}"))
}
