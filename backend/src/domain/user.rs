//! User data model.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rows returned by a listing when the caller does not ask for a limit.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;
/// Rows skipped by a listing when the caller does not ask for an offset.
pub const DEFAULT_PAGE_OFFSET: i64 = 0;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Store-assigned user identifier.
///
/// The backing column is a 32-bit serial, so identifiers outside the `i32`
/// range can never match a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw integer value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a user, kept verbatim. Only the empty string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    ///
    /// # Examples
    /// ```
    /// use user_age_api::domain::{UserName, UserValidationError};
    ///
    /// assert_eq!(UserName::new("Alice").expect("valid").as_ref(), "Alice");
    /// assert_eq!(UserName::new("  ").expect("valid").as_ref(), "  ");
    /// assert_eq!(UserName::new(""), Err(UserValidationError::EmptyName));
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self(name))
    }

    /// Wrap a name read back from storage as-is.
    ///
    /// Stored rows are facts, not input: rows written before validation
    /// existed must still be readable.
    pub(crate) fn from_stored(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The caller-controlled part of a user: what create writes and update
/// replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub name: UserName,
    pub dob: NaiveDate,
}

/// A persisted user.
///
/// ## Invariants
/// - `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    dob: NaiveDate,
}

impl User {
    /// Build a user from its identifier and details.
    #[must_use]
    pub fn new(id: UserId, details: UserDetails) -> Self {
        let UserDetails { name, dob } = details;
        Self { id, name, dob }
    }

    /// Store-assigned identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Date of birth.
    #[must_use]
    pub fn dob(&self) -> NaiveDate {
        self.dob
    }
}

/// Read model pairing a user with its age as of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgedUser {
    pub user: User,
    pub age: u32,
}

/// Limit/offset pagination window. Values are passed to storage unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: DEFAULT_PAGE_OFFSET,
        }
    }
}
