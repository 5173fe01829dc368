//! Domain primitives, ports, and services.
//!
//! Purpose: Define strongly typed user entities, the derived age
//! computation, and the use-case service the HTTP adapter drives. Nothing in
//! this module knows about Actix or Diesel.
//!
//! Public surface:
//! - Error (alias to `error::Error`) - transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`) - stable error identifier.
//! - User / UserDetails / AgedUser - user entity, its mutable part, and the
//!   read model carrying the derived age.
//! - UserService - implementation of the user driving ports.

pub mod age;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::age::{age_at, age_on};
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AgedUser, DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_OFFSET, PageRequest, User, UserDetails, UserId,
    UserName, UserValidationError,
};
pub use self::user_service::{USER_NOT_FOUND, UserService};
