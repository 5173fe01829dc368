//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, User, UserDetails, UserId};

/// Domain use-case port for creating, replacing, and removing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create a user; the store assigns the identifier.
    async fn create_user(&self, details: UserDetails) -> Result<User, Error>;

    /// Replace name and date of birth of an existing user.
    async fn update_user(&self, id: UserId, details: UserDetails) -> Result<User, Error>;

    /// Remove a user.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;
}
