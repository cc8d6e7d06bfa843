//! Configuration system for the gridwin display surface.
//!
//! This crate provides configuration loading, saving, and default values
//! for the display window. It includes:
//!
//! - The `Config` struct and its YAML persistence
//! - Default value functions used by serde
//! - Persisted window geometry (`WindowState`)

pub mod config;
pub mod defaults;
pub mod error;
pub mod window_state;

// Re-export main types for convenience
pub use config::{Config, LogLevel};
pub use error::ConfigError;
pub use window_state::WindowState;
