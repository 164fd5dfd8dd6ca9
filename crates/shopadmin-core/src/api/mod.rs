//! REST API client module for the shop backend.
//!
//! This module provides the `ApiClient` for the admin operations on users,
//! products, orders and customer messages.
//!
//! The API uses JWT bearer authentication. Expired access tokens are renewed
//! through the refresh endpoint by a single shared exchange (see `refresh`).

pub mod account;
pub mod client;
pub mod error;
pub mod messages;
pub mod orders;
pub mod products;
pub mod refresh;
pub mod users;

pub use account::AdminCheck;
pub use client::{ApiClient, ApiRequest, RequestBody};
pub use error::{ApiError, AuthError};
pub use refresh::RefreshCoordinator;

/// Outcome of a sequential bulk delete
#[derive(Debug, Default)]
pub struct BulkDelete {
    pub deleted: Vec<i64>,
    /// The id that could not be deleted and why; later ids were not tried
    pub failed: Option<(i64, ApiError)>,
}

impl BulkDelete {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}
