//! Font loading and glyph rasterization for the gridwin display surface.
//!
//! This crate provides:
//! - Font loading with system font discovery and a fallback chain
//! - Regular/bold face selection through [`FontStyle`]
//! - The [`GlyphRasterizer`] seam the compositor draws through, and
//!   [`SwashRasterizer`], its swash-backed implementation with an LRU cache
//!
//! # Architecture
//!
//! The `FontManager` owns the loaded faces. The `SwashRasterizer` turns
//! `(char, FontStyle)` into an alpha coverage mask, caching results so a
//! grid full of repeated characters rasterizes each glyph once.

mod error;
pub mod font_manager;
pub mod rasterizer;

// Re-export main types for convenience
pub use error::FontError;
pub use font_manager::{FALLBACK_FAMILIES, FontData, FontManager, MONOSPACE_FAMILIES};
pub use rasterizer::{FontStyle, GlyphMask, GlyphRasterizer, RasterizerOptions, SwashRasterizer};
