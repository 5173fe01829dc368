//! Request-scoped correlation identifier.
//!
//! `TraceId` follows a request from the transport edge through handlers and
//! into log events and error payloads. It is passed around as a plain value;
//! there is no ambient lookup.

use std::fmt;

use uuid::Uuid;

/// Header carrying the correlation identifier on requests and responses.
pub const TRACE_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied identifier accepted for reuse.
pub const TRACE_ID_MAX_LEN: usize = 128;

/// Per-request correlation identifier.
///
/// Either supplied by the caller (see [`TraceId::from_header_value`]) or
/// generated as a UUID v4.
///
/// # Examples
/// ```
/// use user_age_api::TraceId;
///
/// let supplied = TraceId::from_header_value("req-42").expect("acceptable id");
/// assert_eq!(supplied.as_str(), "req-42");
/// assert!(TraceId::from_header_value("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a new random trace identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept a caller-supplied identifier when it is non-empty, at most
    /// [`TRACE_ID_MAX_LEN`] bytes, and made of visible ASCII only.
    #[must_use]
    pub fn from_header_value(value: &str) -> Option<Self> {
        let acceptable = !value.is_empty()
            && value.len() <= TRACE_ID_MAX_LEN
            && value.bytes().all(|byte| byte.is_ascii_graphic());
        acceptable.then(|| Self(value.to_owned()))
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for TraceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
