//! Grid state, compositing and presentation for the gridwin display surface.
//!
//! This crate provides:
//!
//! - [`Grid`]: the per-cell state model addressed by draw commands
//! - [`Compositor`]: rasterizes every non-empty cell into a [`FrameBuffer`],
//!   one concurrent task per cell, joined before the frame is handed out
//! - [`SurfacePresenter`]: uploads a finished frame to a wgpu surface

pub mod color;
pub mod compositor;
mod error;
pub mod frame;
pub mod grid;
pub mod presenter;

// Re-export main public types
pub use color::Rgba;
pub use compositor::{CellFailure, CompositeReport, Compositor};
pub use error::RenderError;
pub use frame::FrameBuffer;
pub use grid::{Cell, CellMetrics, Grid, TextCell};
pub use presenter::SurfacePresenter;

// Re-export shared types from dependencies for convenience
pub use gridwin_fonts::{FontStyle, GlyphMask, GlyphRasterizer};
pub use image::RgbaImage;
