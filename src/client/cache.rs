use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::notification::Notification;

use super::live::TokenProvider;

/// What survives on disk between sessions. Fallback data only, never
/// authoritative; the next successful fetch overwrites it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachedNotifications {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
    pub auth_token: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

pub struct NotificationCache {
    path: PathBuf,
}

impl NotificationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file reads as an empty cache; a corrupt file is an error the
    /// caller decides what to do with.
    pub fn load(&self) -> Result<CachedNotifications> {
        if !self.path.exists() {
            return Ok(CachedNotifications::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn store(&self, state: &CachedNotifications) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
        Ok(())
    }
}

/// The cache also serves as the client's token storage.
impl TokenProvider for NotificationCache {
    fn token(&self) -> Option<String> {
        self.load().ok().and_then(|state| state.auth_token)
    }
}
