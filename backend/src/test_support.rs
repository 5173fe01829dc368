//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{DeleteOutcome, UserPersistenceError, UserRepository};
use crate::domain::{PageRequest, User, UserDetails, UserId};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i32, UserDetails>,
    last_id: i32,
}

/// In-memory [`UserRepository`] mirroring the PostgreSQL adapter's contract.
///
/// Identifiers start at 1 and are never reused after deletion. Negative
/// `limit` or `offset` values are rejected as query failures, as PostgreSQL
/// does.
///
/// # Examples
/// ```
/// use user_age_api::test_support::InMemoryUserRepository;
///
/// let repository = InMemoryUserRepository::default();
/// repository.set_unavailable(true);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table>,
    unavailable: AtomicBool,
}

impl InMemoryUserRepository {
    /// Make every subsequent call fail with a connection error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn with_table<T>(
        &self,
        f: impl FnOnce(&mut Table) -> Result<T, UserPersistenceError>,
    ) -> Result<T, UserPersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UserPersistenceError::connection("repository unavailable"));
        }
        let mut table = self
            .table
            .lock()
            .map_err(|_| UserPersistenceError::query("table lock poisoned"))?;
        f(&mut table)
    }
}

fn to_user(id: i32, details: &UserDetails) -> User {
    User::new(UserId::new(id), details.clone())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, details: &UserDetails) -> Result<User, UserPersistenceError> {
        self.with_table(|table| {
            table.last_id += 1;
            let id = table.last_id;
            table.rows.insert(id, details.clone());
            Ok(to_user(id, details))
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        self.with_table(|table| {
            Ok(table
                .rows
                .get(&id.value())
                .map(|details| to_user(id.value(), details)))
        })
    }

    async fn update(
        &self,
        id: UserId,
        details: &UserDetails,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.with_table(|table| {
            Ok(table.rows.get_mut(&id.value()).map(|row| {
                *row = details.clone();
                to_user(id.value(), row)
            }))
        })
    }

    async fn delete(&self, id: UserId) -> Result<DeleteOutcome, UserPersistenceError> {
        self.with_table(|table| {
            Ok(match table.rows.remove(&id.value()) {
                Some(_) => DeleteOutcome::Deleted,
                None => DeleteOutcome::Missing,
            })
        })
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError> {
        let (Ok(limit), Ok(offset)) = (usize::try_from(page.limit), usize::try_from(page.offset))
        else {
            return Err(UserPersistenceError::query(
                "LIMIT and OFFSET must not be negative",
            ));
        };
        self.with_table(|table| {
            Ok(table
                .rows
                .iter()
                .skip(offset)
                .take(limit)
                .map(|(id, details)| to_user(*id, details))
                .collect())
        })
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
