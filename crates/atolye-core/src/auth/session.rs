use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::TokenProvider;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, username: String) -> Self {
        Self {
            token,
            username,
            created_at: Utc::now(),
        }
    }
}

/// File-backed session store.
///
/// The gateway reads the token on every call while login and logout flows
/// replace it; access goes through a lock and the last write wins. Whether
/// the token is still accepted is the backend's call, not ours.
pub struct Session {
    cache_dir: PathBuf,
    data: RwLock<Option<SessionData>>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: RwLock::new(None),
        }
    }

    /// Load session from disk. Returns true if one was found.
    pub fn load(&self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            let data: SessionData = serde_json::from_str(&contents)
                .context("Failed to parse session file")?;
            *self.write() = Some(data);
            return Ok(true);
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = *self.read() {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data, in memory and on disk
    pub fn clear(&self) -> Result<()> {
        *self.write() = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Replace the session with new data (persist separately via `save`)
    pub fn update(&self, data: SessionData) {
        *self.write() = Some(data);
    }

    /// Get the bearer token if a session is stored.
    /// An empty token counts as absent.
    pub fn token(&self) -> Option<String> {
        self.read()
            .as_ref()
            .map(|d| d.token.clone())
            .filter(|t| !t.is_empty())
    }

    /// Username the session was created with
    pub fn username(&self) -> Option<String> {
        self.read().as_ref().map(|d| d.username.clone())
    }

    /// Whether a session is currently stored. Says nothing about whether
    /// the backend still accepts it.
    pub fn is_active(&self) -> bool {
        self.read().is_some()
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<SessionData>> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SessionData>> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenProvider for Session {
    fn token(&self) -> Option<String> {
        Session::token(self)
    }

    fn invalidate(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to clear rejected session");
        }
    }
}
