//! Login, registration and bearer-token resolution.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{
    LoginService, PasswordHasher, PrincipalResolver, RegistrationService, TokenError,
    TokenService, UserRepository,
};
use super::repository_errors::map_user_error;
use super::{
    AuthSession, Email, Error, LoginCredentials, Principal, Registration, User, UserDraft, UserId,
    UserRole,
};

/// Shared by every failed login so callers cannot tell which check failed.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Authentication service implementing the login, registration and token
/// resolution driving ports.
#[derive(Clone)]
pub struct AuthService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
}

impl<U> AuthService<U> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }

    fn start_session(&self, user: User) -> Result<AuthSession, Error> {
        let principal = Principal::new(*user.id(), user.email().clone(), user.role());
        let access_token = self.tokens.issue(&principal).map_err(|err| {
            warn!(error = %err, user_id = %user.id(), "failed to issue access token");
            Error::internal("failed to issue access token")
        })?;
        Ok(AuthSession { user, access_token })
    }
}

impl<U> AuthService<U>
where
    U: UserRepository,
{
    async fn find_by_login_email(&self, raw: &str) -> Result<Option<User>, Error> {
        let Ok(email) = Email::parse(raw) else {
            return Ok(None);
        };
        self.users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)
    }
}

#[async_trait]
impl<U> LoginService for AuthService<U>
where
    U: UserRepository,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let user = self
            .find_by_login_email(credentials.email())
            .await?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .map_err(|err| {
                warn!(error = %err, user_id = %user.id(), "password verification failed");
                Error::internal("password verification failed")
            })?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id(), "user logged in");
        self.start_session(user)
    }
}

#[async_trait]
impl<U> RegistrationService for AuthService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error> {
        let existing = self
            .users
            .find_by_email(registration.email())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::conflict("User with this email already exists"));
        }

        let password_hash = self.hasher.hash(registration.password()).map_err(|err| {
            warn!(error = %err, "password hashing failed");
            Error::internal("password hashing failed")
        })?;
        let now = self.clock.utc();
        let user = User::new(UserDraft {
            id: UserId::random(),
            email: registration.email().clone(),
            first_name: registration.first_name().to_owned(),
            last_name: registration.last_name().to_owned(),
            password_hash,
            role: UserRole::Customer,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.users.create(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "user registered");
        self.start_session(user)
    }
}

#[async_trait]
impl<U> PrincipalResolver for AuthService<U>
where
    U: UserRepository,
{
    async fn resolve(&self, token: &str) -> Result<Principal, Error> {
        let claimed = self.tokens.verify(token).map_err(|err| match err {
            TokenError::Expired => Error::unauthorized("Token has expired"),
            other => {
                warn!(error = %other, "rejected bearer token");
                Error::unauthorized("Invalid token")
            }
        })?;

        let user = self
            .users
            .find_by_id(claimed.user_id())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("User not found"))?;

        Ok(Principal::new(*user.id(), user.email().clone(), user.role()))
    }
}
