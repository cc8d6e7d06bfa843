//! Persisted window geometry.
//!
//! Stored as JSON in the user cache directory. Reading never fails: any
//! problem falls back to the defaults so a corrupt file can't keep the
//! window from opening.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const MIN_WIDTH: u32 = 150;
const MIN_HEIGHT: u32 = 100;

/// Sentinel coordinate meaning "let the window system choose".
pub const UNSET_POSITION: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            x: UNSET_POSITION,
            y: UNSET_POSITION,
        }
    }
}

impl WindowState {
    /// Path of the state file, if the platform has a cache directory.
    pub fn state_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("gridwin").join("window.json"))
    }

    /// Load the remembered geometry, or defaults.
    pub fn load() -> Self {
        match Self::state_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let state = fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str::<WindowState>(&contents).ok());

        match state {
            Some(state) => state.clamped(),
            None => {
                log::debug!("No usable window state at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        match Self::state_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Remembered position, unless it is the "unset" sentinel.
    pub fn position(&self) -> Option<(i32, i32)> {
        if self.x == UNSET_POSITION && self.y == UNSET_POSITION {
            None
        } else {
            Some((self.x, self.y))
        }
    }

    fn clamped(mut self) -> Self {
        self.width = self.width.max(MIN_WIDTH);
        self.height = self.height.max(MIN_HEIGHT);
        self
    }
}
