//! The composited output image.

use crate::color::Rgba;

/// A width x height RGBA8 raster, row-major with no padding between rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Allocate a buffer filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        let mut frame = Self {
            width,
            height,
            pixels: Vec::new(),
        };
        frame.resize(width, height, fill);
        frame
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Change the dimensions, discarding the old contents.
    pub fn resize(&mut self, width: u32, height: u32, fill: Rgba) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
        self.fill(fill);
    }

    pub fn fill(&mut self, color: Rgba) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * 4;
        let px = &self.pixels[offset..offset + 4];
        Some(Rgba::new(px[0], px[1], px[2], px[3]))
    }

    /// Copy of a rectangle's bytes, clipped to the buffer, rows concatenated.
    pub fn rect_bytes(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<u8> {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        if x >= x_end || y >= y_end {
            return Vec::new();
        }
        let mut out = Vec::with_capacity((x_end - x) as usize * (y_end - y) as usize * 4);
        for row in y..y_end {
            let start = row as usize * self.stride() + x as usize * 4;
            let end = row as usize * self.stride() + x_end as usize * 4;
            out.extend_from_slice(&self.pixels[start..end]);
        }
        out
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}
