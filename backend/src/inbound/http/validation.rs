//! Shared validation helpers for inbound HTTP adapters.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{Error, USER_NOT_FOUND, UserId, UserName, UserValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyValue,
    InvalidDate,
    InvalidInteger,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::EmptyValue => "empty_value",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidInteger => "invalid_integer",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Validate a user name, keeping the submitted text verbatim.
pub(crate) fn parse_name(value: String, field: FieldName) -> Result<UserName, Error> {
    UserName::new(value).map_err(|err| match err {
        UserValidationError::EmptyName => {
            ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::EmptyValue)
        }
    })
}

pub(crate) fn invalid_date_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be YYYY-MM-DD"))
        .with_value(ErrorCode::InvalidDate, value)
}

/// Whether `value` is exactly four digits, a dash, two digits, a dash, and
/// two digits. Chrono alone accepts signs, padding-free fields, and leading
/// whitespace.
fn has_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Parse a calendar date in strict `YYYY-MM-DD` form.
///
/// # Examples
/// ```ignore
/// let dob = parse_date("1990-05-10".into(), FieldName::new("dob"))?;
/// ```
pub(crate) fn parse_date(value: String, field: FieldName) -> Result<NaiveDate, Error> {
    if !has_date_shape(&value) {
        return Err(invalid_date_error(field, &value));
    }
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| invalid_date_error(field, &value))
}

pub(crate) fn invalid_integer_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an integer"))
        .with_value(ErrorCode::InvalidInteger, value)
}

/// Parse a user identifier taken from the request path.
///
/// Integers outside the identifier column's range cannot name a stored user
/// and are reported as not found.
pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    let wide = value
        .parse::<i64>()
        .map_err(|_| invalid_integer_error(field, value))?;
    i32::try_from(wide)
        .map(UserId::new)
        .map_err(|_| Error::not_found(USER_NOT_FOUND))
}

/// Parse an optional pagination parameter, keeping `default` when the value
/// is absent or not an integer. Range is left unchecked.
pub(crate) fn parse_page_param(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(default)
}
