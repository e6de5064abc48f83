//! PostgreSQL-backed [`UserRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, PasswordHash, User, UserDraft, UserId, UserRole};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn query_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn write_error(error: diesel::result::Error, email: &Email) -> UserPersistenceError {
    if is_unique_violation(&error) {
        UserPersistenceError::duplicate_email(email.as_str())
    } else {
        query_error(error)
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let invalid = |err: &dyn std::fmt::Display| {
        warn!(user_id = %row.id, error = %err, "stored user row is invalid");
        UserPersistenceError::query("stored user row is invalid")
    };
    let email = Email::parse(&row.email).map_err(|err| invalid(&err))?;
    let password_hash = PasswordHash::new(row.password_hash.as_str()).map_err(|err| invalid(&err))?;
    let role: UserRole = row.role.parse().map_err(|err| invalid(&err))?;
    User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        email,
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        password_hash,
        role,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| invalid(&err))
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: *user.id().as_uuid(),
        email: user.email().as_str().to_owned(),
        first_name: user.first_name().to_owned(),
        last_name: user.last_name().to_owned(),
        password_hash: user.password_hash().as_str().to_owned(),
        role: user.role().as_str().to_owned(),
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        diesel::insert_into(users::table)
            .values(&user_to_row(user))
            .execute(&mut conn)
            .await
            .map_err(|err| write_error(err, user.email()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        let changes = UserChangeset {
            email: user.email().as_str(),
            first_name: user.first_name(),
            last_name: user.last_name(),
            password_hash: user.password_hash().as_str(),
            role: user.role().as_str(),
            updated_at: user.updated_at(),
        };
        let updated = diesel::update(users::table.find(*user.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| write_error(err, user.email()))?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        let deleted = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(query_error)?;
        Ok(deleted > 0)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        let rows: Vec<UserRow> = users::table
            .order((users::created_at.desc(), users::id.desc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query_error)?;
        rows.into_iter().map(row_to_user).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::user;
    use rstest::rstest;

    #[rstest]
    #[case(UserRole::Customer)]
    #[case(UserRole::Admin)]
    fn rows_convert_back_to_the_same_user(#[case] role: UserRole) {
        let original = user("ada@example.com", role);
        let restored = row_to_user(user_to_row(&original)).expect("valid row");

        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.email(), original.email());
        assert_eq!(restored.role(), role);
        assert_eq!(restored.password_hash(), original.password_hash());
    }

    #[rstest]
    fn unknown_role_in_storage_is_a_query_error() {
        let mut row = user_to_row(&user("ada@example.com", UserRole::Customer));
        row.role = "superuser".to_owned();

        assert_eq!(
            row_to_user(row).map(|u| *u.id()),
            Err(UserPersistenceError::query("stored user row is invalid"))
        );
    }

    #[rstest]
    fn unique_violation_becomes_duplicate_email() {
        let email = Email::parse("ada@example.com").expect("email");
        let error = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        );
        assert_eq!(
            write_error(error, &email),
            UserPersistenceError::duplicate_email("ada@example.com")
        );
    }
}
