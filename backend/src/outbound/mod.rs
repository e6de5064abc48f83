//! Driven adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: in-process repositories for running without a database.
//! - **security**: Argon2 password hashing and JWT bearer tokens.

pub mod memory;
pub mod persistence;
pub mod security;
