use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in the config directory. Holds the whole login
/// response under a single key.
const SESSION_FILE: &str = "admin_user.json";

/// The logged-in admin: the token pair returned by the login endpoint plus
/// the profile fields the server attaches to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    /// Same value as `access`; the login response carries both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "isAdmin", alias = "is_admin", default)]
    pub is_admin: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    /// Access token to attach as the bearer credential, if any
    pub fn access_token(&self) -> Option<&str> {
        self.access
            .as_deref()
            .or(self.token.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Refresh token usable for a refresh exchange, if any
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_deref().filter(|t| !t.is_empty())
    }

    /// Merge the result of a successful refresh exchange.
    /// The refresh token is only replaced when the server rotated it.
    pub fn apply_refresh(&mut self, access: &str, rotated_refresh: Option<&str>) {
        self.access = Some(access.to_string());
        self.token = Some(access.to_string());
        if let Some(refresh) = rotated_refresh.filter(|r| !r.is_empty()) {
            self.refresh = Some(refresh.to_string());
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or("unknown")
    }
}

/// Storage for the single session credential.
///
/// Implementations must be cheap to call: the client reads the store before
/// every outbound request.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionData>>;
    fn save(&self, data: &SessionData) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Session persisted as JSON on disk
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create session directory")?;
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(self.path(), contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// In-process session slot
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<SessionData>>,
}

impl MemorySessionStore {
    pub fn new(data: Option<SessionData>) -> Self {
        Self {
            slot: Mutex::new(data),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SessionData>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        Ok(self.slot().clone())
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        *self.slot() = Some(data.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}
