//! PostgreSQL adapters built on Diesel, `diesel-async` and a bb8 pool.
//!
//! Row structs and table definitions stay private to this module; the
//! repositories translate them to domain aggregates and map every Diesel
//! failure onto the port's error enum.

mod diesel_order_repository;
mod diesel_product_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
