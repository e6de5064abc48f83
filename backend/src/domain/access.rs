//! The authenticated caller and the ownership rules applied to it.

use super::{Email, Error, UserId, UserRole};

/// Identity attached to a verified bearer token.
///
/// Token adapters encode these fields as the `sub`, `email` and `role`
/// claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    email: Email,
    role: UserRole,
}

impl Principal {
    pub fn new(user_id: UserId, email: Email, role: UserRole) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Administrators act on anything; everyone else only on their own data.
    pub fn can_access(&self, owner: &UserId) -> bool {
        self.is_admin() || &self.user_id == owner
    }

    /// Fail with `403` unless the caller is an administrator.
    pub fn require_admin(&self, message: &str) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden(message))
        }
    }

    /// Fail with `403` unless the caller owns the resource or is an
    /// administrator.
    pub fn require_access(&self, owner: &UserId, message: &str) -> Result<(), Error> {
        if self.can_access(owner) {
            Ok(())
        } else {
            Err(Error::forbidden(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn principal(role: UserRole) -> Principal {
        Principal::new(
            UserId::random(),
            Email::parse("caller@example.com").expect("email"),
            role,
        )
    }

    #[rstest]
    fn customers_only_access_their_own_resources() {
        let caller = principal(UserRole::Customer);
        let own = *caller.user_id();
        assert!(caller.can_access(&own));
        assert!(!caller.can_access(&UserId::random()));
        let err = caller
            .require_access(&UserId::random(), "Access denied")
            .expect_err("foreign resource");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn admins_access_everything() {
        let caller = principal(UserRole::Admin);
        assert!(caller.can_access(&UserId::random()));
        assert!(caller.require_admin("admins only").is_ok());
    }

    #[rstest]
    fn customers_fail_admin_checks_with_the_given_message() {
        let err = principal(UserRole::Customer)
            .require_admin("Only administrators can view all users")
            .expect_err("not an admin");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), "Only administrators can view all users");
    }
}
