//! The `Config` struct and its YAML persistence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ConfigError;

/// Logging verbosity selectable from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Display surface configuration.
///
/// Cell dimensions define the coordinate system every draw command
/// addresses and are fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Cell width in pixels
    #[serde(default = "defaults::cell_width")]
    pub cell_width: u32,

    /// Cell height in pixels
    #[serde(default = "defaults::cell_height")]
    pub cell_height: u32,

    /// Regular face family (None = first available monospace family)
    #[serde(default)]
    pub font_family: Option<String>,

    /// Bold face family (None = bold weight of the regular family)
    #[serde(default)]
    pub font_family_bold: Option<String>,

    /// Glyph size in pixels
    #[serde(default = "defaults::font_size")]
    pub font_size: f32,

    /// Number of rasterized glyphs kept in the LRU cache
    #[serde(default = "defaults::glyph_cache_entries")]
    pub glyph_cache_entries: usize,

    /// Anti-aliased glyph masks (false = thresholded, crisp edges)
    #[serde(default = "defaults::font_antialias")]
    pub font_antialias: bool,

    /// Apply font hinting when scaling outlines
    #[serde(default = "defaults::font_hinting")]
    pub font_hinting: bool,

    /// Capacity of the pending draw command queue
    #[serde(default = "defaults::queue_capacity")]
    pub queue_capacity: usize,

    /// Target frame interval in milliseconds
    #[serde(default = "defaults::frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Initial window title
    #[serde(default = "defaults::window_title")]
    pub window_title: String,

    /// Initial window width in pixels when no geometry is remembered
    #[serde(default = "defaults::window_width")]
    pub window_width: u32,

    /// Initial window height in pixels when no geometry is remembered
    #[serde(default = "defaults::window_height")]
    pub window_height: u32,

    /// Persist window size/position between runs
    #[serde(default = "defaults::remember_window_geometry")]
    pub remember_window_geometry: bool,

    /// Default log level (overridden by RUST_LOG and --log-level)
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_width: defaults::cell_width(),
            cell_height: defaults::cell_height(),
            font_family: None,
            font_family_bold: None,
            font_size: defaults::font_size(),
            glyph_cache_entries: defaults::glyph_cache_entries(),
            font_antialias: defaults::font_antialias(),
            font_hinting: defaults::font_hinting(),
            queue_capacity: defaults::queue_capacity(),
            frame_interval_ms: defaults::frame_interval_ms(),
            window_title: defaults::window_title(),
            window_width: defaults::window_width(),
            window_height: defaults::window_height(),
            remember_window_geometry: defaults::remember_window_geometry(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell_size(mut self, width: u32, height: u32) -> Self {
        self.cell_width = width;
        self.cell_height = height;
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_frame_interval_ms(mut self, interval_ms: u64) -> Self {
        self.frame_interval_ms = interval_ms;
        self
    }

    /// Load configuration from the default location, creating it if missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults, which are written to `path` so the
    /// user has something to edit. A failed write is logged, not returned.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Config path: {:?}", path);

        if !path.exists() {
            log::info!("Config file not found, creating default at {:?}", path);
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                log::error!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Check field values that serde alone cannot constrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(ConfigError::Validation(format!(
                "cell size must be non-zero, got {}x{}",
                self.cell_width, self.cell_height
            )));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "frame_interval_ms must be at least 1".to_string(),
            ));
        }
        if !(self.font_size > 0.0) {
            return Err(ConfigError::Validation(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("gridwin")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("gridwin")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
