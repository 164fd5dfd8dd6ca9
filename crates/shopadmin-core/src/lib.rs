//! Core library for shopadmin.
//!
//! An authenticated client for the shop's admin REST API: session storage,
//! transparent access-token refresh, the admin resource operations and the
//! dashboard aggregates.

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod utils;

pub use api::{AdminCheck, ApiClient, ApiError, ApiRequest, AuthError, BulkDelete};
pub use auth::{CredentialStore, FileSessionStore, LoginRedirect, MemorySessionStore, SessionData, SessionStore};
pub use config::Config;
pub use dashboard::Dashboard;
