//! CPU compositor.
//!
//! Each frame the output buffer and a full-frame glyph alpha mask are split
//! into one disjoint region per cell, and every non-empty cell is drawn as its
//! own rayon task. The split is done with `chunks_exact_mut`, so the borrow
//! checker, not convention, guarantees that no two cell tasks can write the
//! same pixel. `composite` returns only after every task has joined.

use std::sync::Arc;

use gridwin_fonts::{FontError, GlyphRasterizer};
use rayon::prelude::*;

use crate::color::{Rgba, blend_over};
use crate::frame::FrameBuffer;
use crate::grid::{Cell, Grid, TextCell};

/// Pen x offset from the cell's left edge.
const GLYPH_LEFT_INSET: i32 = 1;
/// Baseline distance above the cell's bottom edge.
const GLYPH_BASELINE_INSET: i32 = 3;

/// A cell whose content could not be rasterized this frame.
#[derive(Debug)]
pub struct CellFailure {
    pub col: usize,
    pub row: usize,
    pub error: FontError,
}

/// Outcome of one composite pass.
#[derive(Debug, Default)]
pub struct CompositeReport {
    /// Non-empty cells drawn, failures included
    pub drawn_cells: usize,
    pub failures: Vec<CellFailure>,
}

/// Rows of one cell's rectangle, top to bottom.
type Region<'a> = Vec<&'a mut [u8]>;

struct CellJob<'a> {
    col: usize,
    row: usize,
    cell: &'a Cell,
    pixels: Region<'a>,
    mask: Region<'a>,
}

pub struct Compositor {
    rasterizer: Arc<dyn GlyphRasterizer>,
    /// Fill for empty cells and the strip outside the last full row/column
    background: Rgba,
    /// Glyph alpha for the whole frame, reused between frames
    text_mask: Vec<u8>,
}

impl Compositor {
    pub fn new(rasterizer: Arc<dyn GlyphRasterizer>) -> Self {
        Self {
            rasterizer,
            background: Rgba::BLACK,
            text_mask: Vec::new(),
        }
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Render every cell of `grid` into `frame`.
    ///
    /// `frame` keeps its dimensions; cells that would fall outside it are not
    /// drawn. Failures are per cell: the cell is left showing its background
    /// and the rest of the frame is unaffected.
    pub fn composite(&mut self, grid: &Grid, frame: &mut FrameBuffer) -> CompositeReport {
        frame.fill(self.background);

        let metrics = grid.metrics();
        let (fit_cols, fit_rows) = metrics.grid_size(frame.width(), frame.height());
        let cols = grid.cols().min(fit_cols);
        let rows = grid.rows().min(fit_rows);

        let width = frame.width() as usize;
        let cell_w = metrics.width as usize;
        let cell_h = metrics.height as usize;

        self.text_mask.clear();
        self.text_mask.resize(width * frame.height() as usize, 0);

        let stride = frame.stride();
        let pixel_regions = split_cells(frame.bytes_mut(), stride, cell_w * 4, cell_h, cols, rows);
        let mask_regions = split_cells(&mut self.text_mask, width, cell_w, cell_h, cols, rows);

        let cells = grid.cells();
        let grid_cols = grid.cols();
        let jobs: Vec<CellJob<'_>> = pixel_regions
            .into_iter()
            .zip(mask_regions)
            .enumerate()
            .filter_map(|(i, (pixels, mask))| {
                let (col, row) = (i % cols, i / cols);
                let cell = &cells[row * grid_cols + col];
                (!cell.is_empty()).then_some(CellJob {
                    col,
                    row,
                    cell,
                    pixels,
                    mask,
                })
            })
            .collect();

        let drawn_cells = jobs.len();
        let rasterizer = &*self.rasterizer;
        let failures: Vec<CellFailure> = jobs
            .into_par_iter()
            .filter_map(|job| draw_cell(rasterizer, job).err())
            .collect();

        CompositeReport {
            drawn_cells,
            failures,
        }
    }
}

/// Split a row-major buffer into `cols * rows` disjoint cell regions.
///
/// `stride` and `span` are in bytes (`span` is one cell's width). Regions are
/// indexed `row * cols + col`.
fn split_cells(
    buf: &mut [u8],
    stride: usize,
    span: usize,
    cell_height: usize,
    cols: usize,
    rows: usize,
) -> Vec<Region<'_>> {
    let mut regions: Vec<Region<'_>> = (0..cols * rows)
        .map(|_| Vec::with_capacity(cell_height))
        .collect();
    if regions.is_empty() || stride == 0 || span == 0 {
        return regions;
    }

    let lines = buf.chunks_exact_mut(stride).take(rows * cell_height);
    for (y, line) in lines.enumerate() {
        let base = (y / cell_height) * cols;
        for (col, piece) in line.chunks_exact_mut(span).take(cols).enumerate() {
            regions[base + col].push(piece);
        }
    }

    debug_assert!(regions.iter().all(|region| region.len() == cell_height));
    regions
}

fn draw_cell(rasterizer: &dyn GlyphRasterizer, job: CellJob<'_>) -> Result<(), CellFailure> {
    let CellJob {
        col,
        row,
        cell,
        mut pixels,
        mut mask,
    } = job;

    match cell {
        Cell::Empty => Ok(()),
        Cell::Image(image) => {
            for (y, line) in pixels.iter_mut().enumerate() {
                for (x, dst) in line.chunks_exact_mut(4).enumerate() {
                    let Some(src) = image.get_pixel_checked(x as u32, y as u32) else {
                        break;
                    };
                    blend_over(dst, src.0, src.0[3]);
                }
            }
            Ok(())
        }
        Cell::Text(text) => draw_text(rasterizer, text, &mut pixels, &mut mask)
            .map_err(|error| CellFailure { col, row, error }),
    }
}

fn draw_text(
    rasterizer: &dyn GlyphRasterizer,
    text: &TextCell,
    pixels: &mut Region<'_>,
    mask: &mut Region<'_>,
) -> Result<(), FontError> {
    let bg = text.bg.to_bytes();
    for line in pixels.iter_mut() {
        for px in line.chunks_exact_mut(4) {
            px.copy_from_slice(&bg);
        }
    }

    let glyph = rasterizer.rasterize(text.ch, text.style)?;

    let cell_h = mask.len() as i32;
    let origin_x = GLYPH_LEFT_INSET + glyph.left;
    let origin_y = cell_h - GLYPH_BASELINE_INSET - glyph.top;
    for (y, line) in mask.iter_mut().enumerate() {
        let gy = y as i32 - origin_y;
        for (x, alpha) in line.iter_mut().enumerate() {
            *alpha = glyph.coverage_at(x as i32 - origin_x, gy);
        }
    }

    let fg = text.fg.to_bytes();
    for (line, alphas) in pixels.iter_mut().zip(mask.iter()) {
        for (px, &alpha) in line.chunks_exact_mut(4).zip(alphas.iter()) {
            if alpha > 0 {
                blend_over(px, fg, alpha);
            }
        }
    }
    Ok(())
}
