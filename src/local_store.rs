//! Device-local key/value storage: the cached user profile and the UI
//! theme, kept in a small JSON file next to the database.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::enums::Theme;
use crate::models::UserProfile;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt local store at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Local store lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LocalData {
    #[serde(rename = "userProfile", default, skip_serializing_if = "Option::is_none")]
    user_profile: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
}

pub struct LocalStore {
    path: PathBuf,
    data: Mutex<LocalData>,
}

impl LocalStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let data = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LocalData::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, LocalData>, StoreError> {
        self.data.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn persist(&self, data: &LocalData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(data).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn profile(&self) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.lock()?.user_profile.clone())
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        data.user_profile = Some(profile.clone());
        self.persist(&data)
    }

    pub fn clear_profile(&self) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        data.user_profile = None;
        self.persist(&data)
    }

    /// Light unless set otherwise.
    pub fn theme(&self) -> Result<Theme, StoreError> {
        Ok(self.lock()?.theme.unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        data.theme = Some(theme);
        self.persist(&data)
    }

    /// Flip light/dark and return the new theme.
    pub fn toggle_theme(&self) -> Result<Theme, StoreError> {
        let mut data = self.lock()?;
        let next = data.theme.unwrap_or_default().toggled();
        data.theme = Some(next);
        self.persist(&data)?;
        tracing::debug!(theme = next.as_str(), "Theme toggled");
        Ok(next)
    }
}
