//! Shared fixtures for handler tests.

use std::sync::{Arc, Mutex, PoisonError};

use actix_web::web;
use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserDraft, UserId};
use crate::inbound::http::state::HttpState;

/// In-memory [`UserRepository`] double backing handler tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    fn users(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.users().clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users().iter().find(|user| user.id() == id).cloned())
    }

    async fn insert(&self, draft: UserDraft) -> Result<User, UserPersistenceError> {
        let user = User::new(UserId::random(), draft);
        self.users().push(user.clone());
        Ok(user)
    }

    async fn replace(
        &self,
        id: &UserId,
        draft: UserDraft,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.users();
        let Some(slot) = users.iter_mut().find(|user| user.id() == id) else {
            return Ok(None);
        };
        *slot = User::new(*id, draft);
        Ok(Some(slot.clone()))
    }

    async fn remove_by_id(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut users = self.users();
        let before = users.len();
        users.retain(|user| user.id() != id);
        Ok(users.len() != before)
    }
}

/// Repository double failing every call, for 500-path coverage.
pub struct FailingUserRepository;

impl FailingUserRepository {
    fn failure() -> UserPersistenceError {
        UserPersistenceError::query("synthetic failure")
    }
}

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        Err(Self::failure())
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Err(Self::failure())
    }

    async fn insert(&self, _draft: UserDraft) -> Result<User, UserPersistenceError> {
        Err(Self::failure())
    }

    async fn replace(
        &self,
        _id: &UserId,
        _draft: UserDraft,
    ) -> Result<Option<User>, UserPersistenceError> {
        Err(Self::failure())
    }

    async fn remove_by_id(&self, _id: &UserId) -> Result<bool, UserPersistenceError> {
        Err(Self::failure())
    }
}

/// Wrap a repository in the state the handlers expect.
pub fn state_with(users: Arc<dyn UserRepository>) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(users))
}
