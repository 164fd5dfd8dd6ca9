//! Shared fixtures for the API integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shopadmin_core::{ApiClient, LoginRedirect, MemorySessionStore, SessionData};
use wiremock::MockServer;

/// Counts how often the client sent the user back to the login screen
#[derive(Default)]
pub struct CountingRedirect(AtomicUsize);

impl CountingRedirect {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn session(access: &str, refresh: Option<&str>) -> SessionData {
    SessionData {
        access: Some(access.to_string()),
        token: Some(access.to_string()),
        refresh: refresh.map(str::to_string),
        id: Some(1),
        username: Some("admin".to_string()),
        email: Some("admin@example.com".to_string()),
        name: Some("Admin".to_string()),
        is_admin: true,
        ..Default::default()
    }
}

pub struct Harness {
    pub client: ApiClient,
    pub store: Arc<MemorySessionStore>,
    pub redirect: Arc<CountingRedirect>,
}

pub fn harness(server: &MockServer, stored: Option<SessionData>) -> Harness {
    let store = Arc::new(MemorySessionStore::new(stored));
    let redirect = Arc::new(CountingRedirect::default());
    let client = ApiClient::new(&server.uri(), store.clone())
        .unwrap()
        .with_redirect(redirect.clone());
    Harness {
        client,
        store,
        redirect,
    }
}
