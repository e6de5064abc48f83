//! Driving ports for reading and maintaining user accounts.

use async_trait::async_trait;

use crate::domain::{Error, Principal, User, UserId, UserRole};

/// Profile changes submitted by a caller. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every account. Administrators only.
    async fn list_users(&self, caller: &Principal) -> Result<Vec<User>, Error>;

    /// One account; callers may read their own, administrators any.
    async fn get_user(&self, caller: &Principal, id: &UserId) -> Result<User, Error>;
}

#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Update the caller's own profile. Role changes are refused for
    /// non-administrators.
    async fn update_own_profile(&self, caller: &Principal, update: UserUpdate)
    -> Result<User, Error>;

    /// Update any account. Administrators only.
    async fn update_user(
        &self,
        caller: &Principal,
        id: &UserId,
        update: UserUpdate,
    ) -> Result<User, Error>;

    /// Delete another account. Administrators only, never themselves.
    async fn delete_user(&self, caller: &Principal, id: &UserId) -> Result<(), Error>;
}
