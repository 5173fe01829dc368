//! Whole-year age derived from a date of birth.
//!
//! Age is never stored. Read paths compute it from the persisted date of
//! birth and a reference date supplied by the caller (normally the UTC
//! calendar date of "now" taken from a [`mockable::Clock`]).

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Age in whole years of someone born on `dob`, as of the calendar date `at`.
///
/// The birthday counts as reached once `(month, day)` of `at` is not before
/// that of `dob`. A `dob` after `at` yields `0` rather than an error.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use user_age_api::domain::age_on;
///
/// let dob = NaiveDate::from_ymd_opt(1990, 5, 10).expect("valid date");
/// let day_before = NaiveDate::from_ymd_opt(2025, 5, 9).expect("valid date");
/// let birthday = NaiveDate::from_ymd_opt(2025, 5, 10).expect("valid date");
/// assert_eq!(age_on(dob, day_before), 34);
/// assert_eq!(age_on(dob, birthday), 35);
/// ```
#[must_use]
pub fn age_on(dob: NaiveDate, at: NaiveDate) -> u32 {
    let mut years = at.year() - dob.year();
    if (at.month(), at.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Age as of the UTC calendar date of `instant`; the time of day is ignored.
#[must_use]
pub fn age_at(dob: NaiveDate, instant: DateTime<Utc>) -> u32 {
    age_on(dob, instant.date_naive())
}
