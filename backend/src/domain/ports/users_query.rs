//! Driving port for user-facing queries.
//!
//! Inbound adapters (HTTP handlers) use this port to read users together with
//! their derived age without importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{AgedUser, Error, PageRequest, UserId};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch one user with its age as of now.
    async fn get_user(&self, id: UserId) -> Result<AgedUser, Error>;

    /// Fetch a page of users, all aged against the same reference date.
    async fn list_users(&self, page: PageRequest) -> Result<Vec<AgedUser>, Error>;
}
