//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly; `diesel print-schema`
//! regenerates them from a live database.

diesel::table! {
    /// User records.
    ///
    /// `id` is a SERIAL primary key; identifiers are never reused.
    users (id) {
        /// Primary key assigned by the database.
        id -> Int4,
        /// User name, never empty.
        name -> Text,
        /// Calendar date of birth.
        dob -> Date,
    }
}
