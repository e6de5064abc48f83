//! Account reads and maintenance with self-or-admin access rules.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::ports::{UserAccountCommand, UserRepository, UserUpdate, UsersQuery};
use super::repository_errors::map_user_error;
use super::{Email, Error, Principal, ProfileChanges, User, UserId};

fn user_not_found() -> Error {
    Error::not_found("User not found")
}

/// User service implementing the account query and command ports.
#[derive(Clone)]
pub struct UserAccountService<U> {
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> UserAccountService<U> {
    pub fn new(users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

impl<U> UserAccountService<U>
where
    U: UserRepository,
{
    async fn load(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)
    }

    async fn ensure_email_available(&self, email: &Email, owner: &UserId) -> Result<(), Error> {
        let holder = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?;
        match holder {
            Some(other) if other.id() != owner => {
                Err(Error::conflict("User with this email already exists"))
            }
            _ => Ok(()),
        }
    }

    async fn apply(&self, id: &UserId, update: UserUpdate) -> Result<User, Error> {
        let current = self.load(id).await?;
        let email = update
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if let Some(email) = &email {
            self.ensure_email_available(email, id).await?;
        }

        let now = self.clock.utc();
        let mut user = current
            .update_profile(
                ProfileChanges {
                    first_name: update.first_name,
                    last_name: update.last_name,
                    email,
                },
                now,
            )
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if let Some(role) = update.role {
            user = user.with_role(role, now);
        }

        let updated = self.users.update(&user).await.map_err(map_user_error)?;
        if !updated {
            return Err(user_not_found());
        }
        Ok(user)
    }
}

#[async_trait]
impl<U> UsersQuery for UserAccountService<U>
where
    U: UserRepository,
{
    async fn list_users(&self, caller: &Principal) -> Result<Vec<User>, Error> {
        caller.require_admin("Only administrators can view all users")?;
        self.users.list().await.map_err(map_user_error)
    }

    async fn get_user(&self, caller: &Principal, id: &UserId) -> Result<User, Error> {
        caller.require_access(id, "You can only view your own profile")?;
        self.load(id).await
    }
}

#[async_trait]
impl<U> UserAccountCommand for UserAccountService<U>
where
    U: UserRepository,
{
    async fn update_own_profile(
        &self,
        caller: &Principal,
        update: UserUpdate,
    ) -> Result<User, Error> {
        if update.role.is_some() && !caller.is_admin() {
            return Err(Error::forbidden("Users cannot change their own role"));
        }
        self.apply(caller.user_id(), update).await
    }

    async fn update_user(
        &self,
        caller: &Principal,
        id: &UserId,
        update: UserUpdate,
    ) -> Result<User, Error> {
        caller.require_admin("Only administrators can update other users")?;
        let user = self.apply(id, update).await?;
        info!(user_id = %id, by = %caller.user_id(), "user updated by administrator");
        Ok(user)
    }

    async fn delete_user(&self, caller: &Principal, id: &UserId) -> Result<(), Error> {
        caller.require_admin("Only administrators can delete users")?;
        if caller.user_id() == id {
            return Err(Error::invalid_request(
                "Administrators cannot delete themselves",
            ));
        }
        let deleted = self.users.delete(id).await.map_err(map_user_error)?;
        if !deleted {
            return Err(user_not_found());
        }
        info!(user_id = %id, by = %caller.user_id(), "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
