//! Default value functions for configuration.
//!
//! Each sub-module groups related `default_*` free functions used as
//! `#[serde(default = "crate::defaults::...")]` attributes on `Config` fields.

mod font;
mod grid;
mod window;

// ── Font & glyph rasterization ─────────────────────────────────────────────
pub use font::{font_antialias, font_hinting, font_size, glyph_cache_entries};

// ── Grid geometry & frame pacing ───────────────────────────────────────────
pub use grid::{cell_height, cell_width, frame_interval_ms, queue_capacity};

// ── Window ─────────────────────────────────────────────────────────────────
pub use window::{remember_window_geometry, window_height, window_title, window_width};
