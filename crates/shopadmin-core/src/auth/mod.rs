//! Authentication module for managing the admin session.
//!
//! This module provides:
//! - `SessionData`: the stored access/refresh token pair and admin profile
//! - `SessionStore`: single-key storage for it (file or in-memory)
//! - `CredentialStore`: remembered passwords via the OS keyring
//! - `LoginRedirect`: hook fired when the session cannot be recovered

pub mod credentials;
pub mod redirect;
pub mod session;

pub use credentials::CredentialStore;
pub use redirect::{LogRedirect, LoginRedirect};
pub use session::{FileSessionStore, MemorySessionStore, SessionData, SessionStore};
