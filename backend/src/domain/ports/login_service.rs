//! Driving ports for authentication use-cases.
//!
//! Inbound adapters call these to log in, sign up, or turn a bearer token
//! into a [`Principal`] without importing the infrastructure behind them.

use async_trait::async_trait;

use crate::domain::{AuthSession, Error, LoginCredentials, Principal, Registration};

/// Exchange credentials for a user and a signed access token.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Fails with `401 Invalid credentials` for unknown emails and wrong
    /// passwords alike.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;
}

/// Create a customer account and sign the new user in.
#[async_trait]
pub trait RegistrationService: Send + Sync {
    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error>;
}

/// Resolve a bearer token to the caller it was issued for.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Fails with `401` when the token is invalid, expired, or its subject no
    /// longer exists.
    async fn resolve(&self, token: &str) -> Result<Principal, Error>;
}
