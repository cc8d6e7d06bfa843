use std::sync::Arc;

use gridwin_fonts::FontError;
use gridwin_render::{
    CellMetrics, Compositor, FontStyle, FrameBuffer, GlyphMask, GlyphRasterizer, Grid, Rgba,
    RgbaImage,
};

const CELL: CellMetrics = CellMetrics::new(8, 12);

/// Deterministic rasterizer: a solid block whose width depends on the code
/// point, so different characters produce different pixels.
struct BlockRasterizer;

impl GlyphRasterizer for BlockRasterizer {
    fn rasterize(&self, ch: char, style: FontStyle) -> Result<Arc<GlyphMask>, FontError> {
        if ch == '\u{E000}' {
            return Err(FontError::MissingGlyph { ch });
        }
        let width = 1 + (ch as u32 % 5);
        let height = if style == FontStyle::Bold { 6 } else { 4 };
        Ok(Arc::new(GlyphMask {
            width,
            height,
            left: 0,
            top: height as i32,
            coverage: vec![255; (width * height) as usize],
        }))
    }
}

fn compositor() -> Compositor {
    Compositor::new(Arc::new(BlockRasterizer))
}

fn surface(cols: u32, rows: u32) -> FrameBuffer {
    FrameBuffer::new(cols * CELL.width, rows * CELL.height, Rgba::BLACK)
}

fn cell_rect(frame: &FrameBuffer, col: u32, row: u32) -> Vec<u8> {
    frame.rect_bytes(col * CELL.width, row * CELL.height, CELL.width, CELL.height)
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 7) as u8, (y * 5) as u8, (x + y) as u8, 255])
    })
}

#[test]
fn test_set_char_changes_only_its_rectangle() {
    let mut grid = Grid::new(CELL, 4, 3);
    let mut frame = surface(4, 3);
    let mut compositor = compositor();
    compositor.composite(&grid, &mut frame);
    let before = frame.clone();

    grid.set_char(2, 1, 'k', Rgba::WHITE, Rgba::opaque(0, 40, 0), FontStyle::Normal);
    let report = compositor.composite(&grid, &mut frame);
    assert_eq!(report.drawn_cells, 1);

    for row in 0..3 {
        for col in 0..4 {
            let changed = cell_rect(&frame, col, row) != cell_rect(&before, col, row);
            assert_eq!(changed, (col, row) == (2, 1), "cell ({col}, {row})");
        }
    }
}

#[test]
fn test_set_image_fills_its_rectangle() {
    let mut grid = Grid::new(CELL, 3, 2);
    let tile = gradient(CELL.width, CELL.height);
    grid.set_image(1, 1, Arc::new(tile.clone()));

    let mut frame = surface(3, 2);
    compositor().composite(&grid, &mut frame);

    assert_eq!(cell_rect(&frame, 1, 1), tile.into_raw());
    assert!(cell_rect(&frame, 0, 0).chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn test_transparent_image_pixels_show_background() {
    let mut grid = Grid::new(CELL, 1, 1);
    let tile = RgbaImage::from_fn(CELL.width, CELL.height, |x, _| {
        if x < 4 {
            image::Rgba([200, 0, 0, 255])
        } else {
            image::Rgba([0, 200, 0, 0])
        }
    });
    grid.set_image(0, 0, Arc::new(tile));

    let mut frame = surface(1, 1);
    compositor().composite(&grid, &mut frame);
    assert_eq!(frame.pixel(0, 0), Some(Rgba::opaque(200, 0, 0)));
    assert_eq!(frame.pixel(6, 0), Some(Rgba::BLACK));
}

#[test]
fn test_out_of_bounds_commands_leave_grid_unchanged() {
    let mut grid = Grid::new(CELL, 4, 3);
    grid.set_char(0, 0, 'a', Rgba::WHITE, Rgba::BLACK, FontStyle::Normal);
    let before = grid.cells().to_vec();

    grid.set_char(4, 0, 'b', Rgba::WHITE, Rgba::BLACK, FontStyle::Normal);
    grid.set_char(0, 3, 'b', Rgba::WHITE, Rgba::BLACK, FontStyle::Normal);
    grid.set_char(i32::MAX, i32::MIN, 'b', Rgba::WHITE, Rgba::BLACK, FontStyle::Bold);
    grid.set_image(9, 9, Arc::new(gradient(CELL.width, CELL.height)));
    grid.clear_cell(-3, 1);

    assert_eq!(grid.cells(), before.as_slice());
}

#[test]
fn test_clear_renders_empty_buffer() {
    let mut grid = Grid::new(CELL, 3, 3);
    let mut compositor = compositor();
    let mut empty = surface(3, 3);
    compositor.composite(&grid, &mut empty);

    grid.set_char(0, 0, 'x', Rgba::WHITE, Rgba::opaque(9, 9, 9), FontStyle::Bold);
    grid.place_image_tiled(&gradient(20, 20), 1, 1);
    let mut frame = surface(3, 3);
    compositor.composite(&grid, &mut frame);
    assert_ne!(frame, empty);

    grid.clear();
    let report = compositor.composite(&grid, &mut frame);
    assert_eq!(report.drawn_cells, 0);
    assert_eq!(frame, empty);
}

#[test]
fn test_tiled_image_round_trips() {
    // 20x30 over 8x12 cells -> 3x3 tiles, trailing ones cropped
    let source = gradient(20, 30);
    let mut grid = Grid::new(CELL, 6, 5);
    let placed = grid.place_image_tiled(&source, 1, 1);
    assert_eq!(placed, 9);
    assert_eq!(grid.non_empty_count(), 9);

    let mut frame = surface(6, 5);
    compositor().composite(&grid, &mut frame);

    let reassembled = frame.rect_bytes(CELL.width, CELL.height, 20, 30);
    assert_eq!(reassembled, source.into_raw());
}

#[test]
fn test_tiled_image_clipped_by_grid() {
    let source = gradient(40, 40);
    let mut grid = Grid::new(CELL, 3, 2);
    // 5x4 tiles from (1, 0): only cols 1..3 and rows 0..2 exist
    assert_eq!(grid.place_image_tiled(&source, 1, 0), 4);
}

#[test]
fn test_resize_discards_content() {
    let mut grid = Grid::new(CELL, 80, 24);
    let bg = Rgba::opaque(0, 0, 90);
    for col in 0..80 {
        grid.set_char(col, col % 24, 'z', Rgba::WHITE, bg, FontStyle::Normal);
    }
    grid.resize(40, 12);
    assert_eq!((grid.cols(), grid.rows()), (40, 12));

    let mut frame = surface(40, 12);
    compositor().composite(&grid, &mut frame);
    assert!(frame.as_bytes().chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn test_glyph_failure_is_reported_per_cell() {
    let mut grid = Grid::new(CELL, 2, 1);
    grid.set_char(0, 0, '\u{E000}', Rgba::WHITE, Rgba::BLACK, FontStyle::Normal);
    grid.set_char(1, 0, 'm', Rgba::WHITE, Rgba::BLACK, FontStyle::Normal);

    let mut frame = surface(2, 1);
    let report = compositor().composite(&grid, &mut frame);
    assert_eq!(report.drawn_cells, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].col, 0);
    assert!(matches!(report.failures[0].error, FontError::MissingGlyph { .. }));
    assert!(cell_rect(&frame, 1, 0).chunks_exact(4).any(|px| px == [255, 255, 255, 255]));
}

#[test]
fn test_many_cells_render_deterministically() {
    let mut grid = Grid::new(CELL, 30, 20);
    let (fg, bg) = (Rgba::opaque(250, 200, 10), Rgba::opaque(5, 5, 60));
    for row in 0..20 {
        for col in 0..30 {
            let ch = char::from(b'a' + ((col + row) % 26) as u8);
            let style = if col % 2 == 0 { FontStyle::Bold } else { FontStyle::Normal };
            grid.set_char(col, row, ch, fg, bg, style);
        }
    }

    let mut compositor = compositor();
    let mut first = surface(30, 20);
    let mut second = surface(30, 20);
    compositor.composite(&grid, &mut first);
    compositor.composite(&grid, &mut second);
    assert_eq!(first, second);
}
