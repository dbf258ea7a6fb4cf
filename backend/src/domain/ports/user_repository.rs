//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserDraft, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// The backing store could not be reached.
    #[error("user store connection failed: {message}")]
    Connection { message: String },
    /// A read or write failed during execution.
    #[error("user store query failed: {message}")]
    Query { message: String },
}

impl UserPersistenceError {
    /// Construct a [`UserPersistenceError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Construct a [`UserPersistenceError::Query`].
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Storage adapter contract shared by the flat-file and document-store
/// backends.
///
/// Absence is data, not an error: lookups return `Option`/`bool` and only
/// backend failures travel through `Err`. Both implementations must be
/// observably identical through this interface, durability aside.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every stored record, in the backend's natural iteration order.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Persist a new record under a freshly generated id and return it.
    async fn insert(&self, draft: UserDraft) -> Result<User, UserPersistenceError>;

    /// Overwrite an existing record's name and email wholesale, keeping its
    /// id. Returns `None` when no record with `id` exists.
    async fn replace(
        &self,
        id: &UserId,
        draft: UserDraft,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Delete a record. Returns `false` when no record with `id` exists.
    async fn remove_by_id(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
