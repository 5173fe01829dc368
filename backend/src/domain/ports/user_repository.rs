//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{PageRequest, User, UserDetails, UserId};

/// Persistence errors raised by user repository adapters.
///
/// Both variants are storage failures as far as callers are concerned; the
/// split only helps operators read the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
}

impl UserPersistenceError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row existed and has been removed.
    Deleted,
    /// No row had the requested identifier.
    Missing,
}

/// Driven port owning the persisted user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return it with its assigned identifier.
    async fn create(&self, details: &UserDetails) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Replace name and date of birth of an existing user.
    ///
    /// Returns `Ok(None)` when no row has `id`; nothing is created.
    async fn update(
        &self,
        id: UserId,
        details: &UserDetails,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Permanently remove a user.
    async fn delete(&self, id: UserId) -> Result<DeleteOutcome, UserPersistenceError>;

    /// Return one page of users ordered by identifier.
    async fn list(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError>;
}
