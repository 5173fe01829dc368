//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Every operation is a single statement, so atomicity is per row and no
//! transaction spans more than one call.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{DeleteOutcome, UserPersistenceError, UserRepository};
use crate::domain::{PageRequest, User, UserDetails, UserId, UserName};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain user persistence errors.
fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain user persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) => UserPersistenceError::query(info.message()),
        _ => UserPersistenceError::query("database error"),
    }
}

/// Convert a database row to a domain user. Rows are trusted as stored.
fn row_to_user(row: UserRow) -> User {
    let UserRow { id, name, dob } = row;
    User::new(
        UserId::new(id),
        UserDetails {
            name: UserName::from_stored(name),
            dob,
        },
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, details: &UserDetails) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            name: details.name.as_ref(),
            dob: details.dob,
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_user(row))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.value())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn update(
        &self,
        id: UserId,
        details: &UserDetails,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = UserChangeset {
            name: details.name.as_ref(),
            dob: details.dob,
        };
        let row: Option<UserRow> = diesel::update(users::table.find(id.value()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn delete(&self, id: UserId) -> Result<DeleteOutcome, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(users::table.find(id.value()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(if removed == 0 {
            DeleteOutcome::Missing
        } else {
            DeleteOutcome::Deleted
        })
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .limit(page.limit)
            .offset(page.offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn row(id: i32, name: &str) -> UserRow {
        UserRow {
            id,
            name: name.to_owned(),
            dob: NaiveDate::from_ymd_opt(1990, 5, 10).expect("valid date"),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, UserPersistenceError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(repo_err, UserPersistenceError::Query { .. }));
        assert!(repo_err.to_string().contains("record not found"));
    }

    #[rstest]
    fn row_to_user_converts_columns() {
        let user = row_to_user(row(7, "Alice"));

        assert_eq!(user.id(), UserId::new(7));
        assert_eq!(user.name().as_ref(), "Alice");
        assert_eq!(
            user.dob(),
            NaiveDate::from_ymd_opt(1990, 5, 10).expect("valid date")
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn row_to_user_keeps_names_that_input_validation_would_reject(#[case] name: &str) {
        let user = row_to_user(row(8, name));

        assert_eq!(user.id(), UserId::new(8));
        assert_eq!(user.name().as_ref(), name);
    }
}
