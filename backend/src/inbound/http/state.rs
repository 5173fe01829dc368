//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Write-side user use-cases.
    pub users: Arc<dyn UsersCommand>,
    /// Read-side user use-cases.
    pub users_query: Arc<dyn UsersQuery>,
}

impl HttpState {
    /// Construct state from the two user ports.
    ///
    /// # Examples
    /// ```ignore
    /// let service = Arc::new(UserService::new(repository, clock));
    /// let state = HttpState::new(service.clone(), service);
    /// ```
    pub fn new(users: Arc<dyn UsersCommand>, users_query: Arc<dyn UsersQuery>) -> Self {
        Self { users, users_query }
    }
}
