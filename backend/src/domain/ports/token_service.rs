//! Port for issuing and checking bearer tokens.

use crate::domain::{AccessToken, Principal};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Signature, format or claims are wrong.
        Invalid { message: String } => "invalid token: {message}",
        /// The token is past its expiry.
        Expired => "token has expired",
        /// The adapter could not sign a new token.
        Signing { message: String } => "token signing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token carrying the principal's id, email and role.
    fn issue(&self, principal: &Principal) -> Result<AccessToken, TokenError>;

    /// Verify a token and recover the principal it was issued for.
    fn verify(&self, token: &str) -> Result<Principal, TokenError>;
}
