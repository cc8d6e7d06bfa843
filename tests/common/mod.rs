//! Shared integration test helpers for gridwin.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{SharedBuffer, scheduler_with};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers are used per file.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use gridwin::events::EventEmitter;
use gridwin::queue::{self, CommandSender};
use gridwin::scheduler::FrameScheduler;
use gridwin_fonts::FontError;
use gridwin_render::{CellMetrics, Compositor, FontStyle, GlyphMask, GlyphRasterizer};
use parking_lot::Mutex;
use serde_json::Value;

pub const CELL: CellMetrics = CellMetrics::new(8, 12);

/// Code point the stub rasterizer refuses to render.
pub const MISSING_GLYPH: char = '\u{E000}';

/// Deterministic rasterizer: a solid block sized by style.
pub struct StubRasterizer;

impl GlyphRasterizer for StubRasterizer {
    fn rasterize(&self, ch: char, style: FontStyle) -> Result<Arc<GlyphMask>, FontError> {
        if ch == MISSING_GLYPH {
            return Err(FontError::MissingGlyph { ch });
        }
        let (width, height) = match style {
            FontStyle::Normal => (4, 6),
            FontStyle::Bold => (6, 8),
        };
        Ok(Arc::new(GlyphMask {
            width,
            height,
            left: 0,
            top: height as i32,
            coverage: vec![255; (width * height) as usize],
        }))
    }
}

/// An in-memory event sink that can be read back while the emitter holds it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Every emitted line, parsed.
    pub fn events(&self) -> Vec<Value> {
        let bytes = self.0.lock().clone();
        String::from_utf8(bytes)
            .expect("events are UTF-8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("each line is one JSON object"))
            .collect()
    }

    /// Emitted events of one `type`.
    pub fn events_of(&self, kind: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|event| event["type"] == kind)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn emitter() -> (Arc<EventEmitter>, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (Arc::new(EventEmitter::new(buffer.clone())), buffer)
}

/// A scheduler for a `cols x rows` grid with a stub rasterizer.
pub struct Harness {
    pub scheduler: FrameScheduler,
    pub sender: CommandSender,
    pub events: SharedBuffer,
    pub shutdown: Arc<AtomicBool>,
}

pub fn scheduler_with(cols: u32, rows: u32, capacity: usize) -> Harness {
    let (sender, command_queue) = queue::bounded(capacity);
    let (emitter, events) = emitter();
    let shutdown = Arc::new(AtomicBool::new(false));
    let scheduler = FrameScheduler::new(
        CELL,
        (cols * CELL.width, rows * CELL.height),
        Compositor::new(Arc::new(StubRasterizer)),
        command_queue,
        emitter,
        Arc::clone(&shutdown),
        Duration::from_millis(1),
    );
    Harness {
        scheduler,
        sender,
        events,
        shutdown,
    }
}

/// `image` encoded as PNG, then base64.
pub fn png_base64(image: &gridwin_render::RgbaImage) -> String {
    use base64::Engine;
    let mut bytes = io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("PNG encoding succeeds");
    base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
}
