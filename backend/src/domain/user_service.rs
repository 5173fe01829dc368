//! User domain service implementing the command and query driving ports.
//!
//! The service owns the translation from repository outcomes to domain
//! errors: missing rows become [`ErrorCode::NotFound`](crate::domain::ErrorCode)
//! and storage failures become an internal error with a fixed per-operation
//! message after being logged in full.
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::error;

use crate::domain::ports::{
    DeleteOutcome, UserPersistenceError, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::{AgedUser, Error, PageRequest, User, UserDetails, UserId, age_at};

/// Message carried by every missing-user error.
pub const USER_NOT_FOUND: &str = "user not found";

/// Operations whose storage failures are reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Get,
    Update,
    Delete,
    List,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create_user",
            Self::Get => "get_user",
            Self::Update => "update_user",
            Self::Delete => "delete_user",
            Self::List => "list_users",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Create => "Failed to create user",
            Self::Get => "Failed to get user",
            Self::Update => "Failed to update user",
            Self::Delete => "Failed to delete user",
            Self::List => "Failed to list users",
        }
    }
}

fn map_persistence_error(operation: Operation, err: UserPersistenceError) -> Error {
    error!(operation = operation.as_str(), error = %err, "user storage operation failed");
    Error::internal(operation.failure_message())
}

/// User service backed by a [`UserRepository`] and a clock for age reads.
#[derive(Clone)]
pub struct UserService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UserService<R> {
    /// Create a new service.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use user_age_api::domain::UserService;
    /// # use user_age_api::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
    /// let service = UserService::new(
    ///     Arc::new(DieselUserRepository::new(pool)),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, details: UserDetails) -> Result<User, Error> {
        self.repository
            .create(&details)
            .await
            .map_err(|err| map_persistence_error(Operation::Create, err))
    }

    async fn update_user(&self, id: UserId, details: UserDetails) -> Result<User, Error> {
        self.repository
            .update(id, &details)
            .await
            .map_err(|err| map_persistence_error(Operation::Update, err))?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        let outcome = self
            .repository
            .delete(id)
            .await
            .map_err(|err| map_persistence_error(Operation::Delete, err))?;
        match outcome {
            DeleteOutcome::Deleted => Ok(()),
            DeleteOutcome::Missing => Err(Error::not_found(USER_NOT_FOUND)),
        }
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository,
{
    async fn get_user(&self, id: UserId) -> Result<AgedUser, Error> {
        let user = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|err| map_persistence_error(Operation::Get, err))?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
        let age = age_at(user.dob(), self.clock.utc());
        Ok(AgedUser { user, age })
    }

    async fn list_users(&self, page: PageRequest) -> Result<Vec<AgedUser>, Error> {
        let users = self
            .repository
            .list(page)
            .await
            .map_err(|err| map_persistence_error(Operation::List, err))?;
        let now = self.clock.utc();
        Ok(users
            .into_iter()
            .map(|user| {
                let age = age_at(user.dob(), now);
                AgedUser { user, age }
            })
            .collect())
    }
}
