use async_trait::async_trait;

use super::{InMemoryStore, newest_first};
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId};

/// [`UserRepository`] over the shared in-memory store.
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

impl InMemoryUserRepository {
    pub(super) fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.store.lock().map_err(UserPersistenceError::connection)?;
        if state.users.values().any(|u| u.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_str()));
        }
        state.users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.store.lock().map_err(UserPersistenceError::connection)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let state = self.store.lock().map_err(UserPersistenceError::connection)?;
        Ok(state.users.values().find(|u| u.email() == email).cloned())
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut state = self.store.lock().map_err(UserPersistenceError::connection)?;
        if !state.users.contains_key(user.id()) {
            return Ok(false);
        }
        let taken = state
            .users
            .values()
            .any(|u| u.id() != user.id() && u.email() == user.email());
        if taken {
            return Err(UserPersistenceError::duplicate_email(user.email().as_str()));
        }
        state.users.insert(*user.id(), user.clone());
        Ok(true)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.store.lock().map_err(UserPersistenceError::connection)?;
        let removed = state.users.remove(id).is_some();
        if removed {
            state.orders.retain(|_, order| order.user_id() != id);
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.store.lock().map_err(UserPersistenceError::connection)?;
        let users = state.users.values().cloned().collect();
        Ok(newest_first(users, |u| (u.created_at(), *u.id())))
    }
}
