//! Grid state store.
//!
//! A `cols x rows` matrix of [`Cell`]s addressed by signed `(col, row)`
//! coordinates. Anything outside the live grid, negative coordinates
//! included, is silently ignored: the controller and the window routinely
//! disagree about the grid size for a frame or two after a resize.

use std::sync::Arc;

use gridwin_fonts::FontStyle;
use image::{RgbaImage, imageops};
use rayon::prelude::*;

use crate::color::Rgba;

/// Pixel size of one cell. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellMetrics {
    pub width: u32,
    pub height: u32,
}

impl CellMetrics {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Grid dimensions `(cols, rows)` that fit a surface of the given size.
    pub fn grid_size(&self, surface_width: u32, surface_height: u32) -> (usize, usize) {
        if self.width == 0 || self.height == 0 {
            return (0, 0);
        }
        (
            (surface_width / self.width) as usize,
            (surface_height / self.height) as usize,
        )
    }

    /// Cell coordinate under a pixel position, flooring toward negative infinity.
    pub fn cell_at(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.width.max(1) as f64).floor() as i32,
            (y / self.height.max(1) as f64).floor() as i32,
        )
    }
}

/// A text cell's content. Colors are always fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCell {
    pub ch: char,
    pub fg: Rgba,
    pub bg: Rgba,
    pub style: FontStyle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(TextCell),
    /// A raster exactly one cell in size.
    Image(Arc<RgbaImage>),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    metrics: CellMetrics,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(metrics: CellMetrics, cols: usize, rows: usize) -> Self {
        Self {
            metrics,
            cols,
            rows,
            cells: vec![Cell::Empty; cols * rows],
        }
    }

    /// Grid sized for a surface of `width x height` pixels.
    pub fn for_surface(metrics: CellMetrics, width: u32, height: u32) -> Self {
        let (cols, rows) = metrics.grid_size(width, height);
        Self::new(metrics, cols, rows)
    }

    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Row-major cell storage.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Replace the grid with a fresh all-empty one. Content is not reflowed.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        log::debug!(
            "Grid resize {}x{} -> {}x{}, discarding content",
            self.cols,
            self.rows,
            cols,
            rows
        );
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![Cell::Empty; cols * rows];
    }

    fn index_of(&self, col: i64, row: i64) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }

    pub fn cell(&self, col: i32, row: i32) -> Option<&Cell> {
        self.index_of(col.into(), row.into()).map(|idx| &self.cells[idx])
    }

    /// Set a text cell. Returns false (and changes nothing) when out of bounds.
    pub fn set_char(
        &mut self,
        col: i32,
        row: i32,
        ch: char,
        fg: Rgba,
        bg: Rgba,
        style: FontStyle,
    ) -> bool {
        let Some(idx) = self.index_of(col.into(), row.into()) else {
            return false;
        };
        self.cells[idx] = Cell::Text(TextCell {
            ch,
            fg: fg.with_full_alpha(),
            bg: bg.with_full_alpha(),
            style,
        });
        true
    }

    /// Set an image cell. A raster that is not exactly one cell in size is
    /// cropped (or padded with transparency) to fit.
    pub fn set_image(&mut self, col: i32, row: i32, image: Arc<RgbaImage>) -> bool {
        let Some(idx) = self.index_of(col.into(), row.into()) else {
            return false;
        };
        let image = if image.dimensions() == (self.metrics.width, self.metrics.height) {
            image
        } else {
            Arc::new(extract_tile(&image, 0, 0, self.metrics))
        };
        self.cells[idx] = Cell::Image(image);
        true
    }

    /// Reset one cell to empty. Out of bounds is a no-op.
    pub fn clear_cell(&mut self, col: i32, row: i32) {
        if let Some(idx) = self.index_of(col.into(), row.into()) {
            self.cells[idx] = Cell::Empty;
        }
    }

    /// Reset every cell to empty without resizing.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Cut `image` into cell-sized tiles and place them starting at
    /// `(start_col, start_row)`.
    ///
    /// Produces `ceil(w / cell_width) x ceil(h / cell_height)` tiles; the
    /// trailing partial tiles carry the remaining source pixels and are
    /// transparent beyond them. Tiles landing outside the grid are skipped.
    /// Returns the number of cells populated.
    pub fn place_image_tiled(
        &mut self,
        image: &RgbaImage,
        start_col: i32,
        start_row: i32,
    ) -> usize {
        let metrics = self.metrics;
        if metrics.width == 0 || metrics.height == 0 {
            return 0;
        }
        let tiles_x = image.width().div_ceil(metrics.width);
        let tiles_y = image.height().div_ceil(metrics.height);

        let targets: Vec<(usize, u32, u32)> = (0..tiles_y)
            .flat_map(|ty| (0..tiles_x).map(move |tx| (tx, ty)))
            .filter_map(|(tx, ty)| {
                let idx = self.index_of(
                    i64::from(start_col) + i64::from(tx),
                    i64::from(start_row) + i64::from(ty),
                )?;
                Some((idx, tx, ty))
            })
            .collect();

        // Tiles target distinct cells; extraction fans out and joins before
        // the grid is touched.
        let tiles: Vec<(usize, RgbaImage)> = targets
            .into_par_iter()
            .map(|(idx, tx, ty)| {
                let tile = extract_tile(image, tx * metrics.width, ty * metrics.height, metrics);
                (idx, tile)
            })
            .collect();

        let placed = tiles.len();
        for (idx, tile) in tiles {
            self.cells[idx] = Cell::Image(Arc::new(tile));
        }
        log::trace!(
            "Tiled {}x{} image into {} of {}x{} cells",
            image.width(),
            image.height(),
            placed,
            tiles_x,
            tiles_y
        );
        placed
    }
}

/// One cell-sized tile of `image` with its top-left at `(x, y)`.
fn extract_tile(image: &RgbaImage, x: u32, y: u32, metrics: CellMetrics) -> RgbaImage {
    let mut tile = RgbaImage::new(metrics.width, metrics.height);
    if x < image.width() && y < image.height() {
        let source = imageops::crop_imm(image, x, y, metrics.width, metrics.height).to_image();
        imageops::replace(&mut tile, &source, 0, 0);
    }
    tile
}
