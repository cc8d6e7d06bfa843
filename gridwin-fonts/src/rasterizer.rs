//! Glyph rasterization.
//!
//! The compositor only ever sees the [`GlyphRasterizer`] trait, so it can run
//! against the swash implementation here or a deterministic stub in tests.

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::Format;

use crate::error::FontError;
use crate::font_manager::FontManager;

/// Face selection for a text cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
}

impl FontStyle {
    /// Parse a wire style name. Only the exact lowercase names are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(FontStyle::Normal),
            "bold" => Some(FontStyle::Bold),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Bold => "bold",
        }
    }
}

/// An 8-bit coverage mask for one glyph, positioned relative to the pen.
///
/// `left` is the horizontal offset from the pen position to the first
/// column; `top` is the distance from the baseline up to the first row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlyphMask {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    /// Coverage at mask-local `(x, y)`, zero outside the mask.
    pub fn coverage_at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }
}

/// Something that can turn a code point into a coverage mask.
///
/// Implementations are shared across the compositor's cell tasks, so they
/// must be callable concurrently.
pub trait GlyphRasterizer: Send + Sync {
    fn rasterize(&self, ch: char, style: FontStyle) -> Result<Arc<GlyphMask>, FontError>;
}

/// Rasterizer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerOptions {
    /// Glyph size in pixels
    pub size_px: f32,
    /// Number of rasterized glyphs to keep
    pub cache_entries: usize,
    /// Anti-aliased masks; false thresholds coverage to 0/255
    pub antialias: bool,
    /// Apply hinting when scaling
    pub hinting: bool,
}

impl Default for RasterizerOptions {
    fn default() -> Self {
        Self {
            size_px: 18.0,
            cache_entries: 2048,
            antialias: true,
            hinting: true,
        }
    }
}

thread_local! {
    // ScaleContext holds scratch buffers and is not Sync; one per worker thread.
    static SCALE_CONTEXT: RefCell<ScaleContext> = RefCell::new(ScaleContext::new());
}

/// swash-backed [`GlyphRasterizer`] with an LRU glyph cache.
pub struct SwashRasterizer {
    fonts: Arc<FontManager>,
    options: RasterizerOptions,
    cache: Mutex<LruCache<(char, FontStyle), Arc<GlyphMask>>>,
}

impl SwashRasterizer {
    pub fn new(fonts: Arc<FontManager>, options: RasterizerOptions) -> Self {
        let capacity = NonZeroUsize::new(options.cache_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            fonts,
            options,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn options(&self) -> &RasterizerOptions {
        &self.options
    }

    pub fn cached_glyphs(&self) -> usize {
        self.cache.lock().len()
    }

    fn render(&self, ch: char, style: FontStyle) -> Result<GlyphMask, FontError> {
        let (font, glyph_id) = self
            .fonts
            .find_glyph(ch, style)
            .ok_or(FontError::MissingGlyph { ch })?;

        let image = SCALE_CONTEXT.with(|context| {
            let mut context = context.borrow_mut();
            let mut scaler = context
                .builder(font)
                .size(self.options.size_px)
                .hint(self.options.hinting)
                .build();

            // Color sources first so emoji faces render; plain outline faces
            // fall through to Outline.
            Render::new(&[
                Source::ColorBitmap(StrikeWith::BestFit),
                Source::ColorOutline(0),
                Source::Outline,
            ])
            .format(Format::Alpha)
            .render(&mut scaler, glyph_id)
        });
        let image = image.ok_or(FontError::RenderFailed { ch })?;

        let pixel_count = image.placement.width as usize * image.placement.height as usize;
        let mut coverage = match image.content {
            Content::Mask => image.data,
            // Color glyphs are drawn through the foreground like any other;
            // their alpha channel is the mask.
            Content::Color => image.data.chunks_exact(4).map(|px| px[3]).collect(),
            Content::SubpixelMask => {
                let stride = if pixel_count > 0 {
                    image.data.len() / pixel_count
                } else {
                    0
                };
                if stride >= 3 {
                    image
                        .data
                        .chunks_exact(stride)
                        .map(|px| {
                            ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000)
                                as u8
                        })
                        .collect()
                } else {
                    vec![255; pixel_count]
                }
            }
        };
        coverage.resize(pixel_count, 0);

        if !self.options.antialias {
            for alpha in &mut coverage {
                *alpha = if *alpha > 127 { 255 } else { 0 };
            }
        }

        Ok(GlyphMask {
            width: image.placement.width,
            height: image.placement.height,
            left: image.placement.left,
            top: image.placement.top,
            coverage,
        })
    }
}

impl GlyphRasterizer for SwashRasterizer {
    fn rasterize(&self, ch: char, style: FontStyle) -> Result<Arc<GlyphMask>, FontError> {
        if let Some(mask) = self.cache.lock().get(&(ch, style)) {
            return Ok(Arc::clone(mask));
        }

        // Rasterize outside the lock; two threads racing on the same glyph
        // just produce identical masks.
        let mask = Arc::new(self.render(ch, style)?);
        self.cache.lock().put((ch, style), Arc::clone(&mask));
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_names() {
        assert_eq!(FontStyle::from_name("normal"), Some(FontStyle::Normal));
        assert_eq!(FontStyle::from_name("bold"), Some(FontStyle::Bold));
        assert_eq!(FontStyle::from_name("Bold"), None);
        assert_eq!(FontStyle::from_name("italic"), None);
        assert_eq!(FontStyle::Bold.name(), "bold");
    }

    #[test]
    fn test_mask_coverage_outside_is_zero() {
        let mask = GlyphMask {
            width: 2,
            height: 1,
            left: 0,
            top: 1,
            coverage: vec![10, 20],
        };
        assert_eq!(mask.coverage_at(1, 0), 20);
        assert_eq!(mask.coverage_at(2, 0), 0);
        assert_eq!(mask.coverage_at(-1, 0), 0);
        assert_eq!(mask.coverage_at(0, 1), 0);
    }

    #[test]
    fn test_swash_rasterizer_caches() {
        let Ok(fonts) = FontManager::new(None, None) else {
            return;
        };
        let rasterizer = SwashRasterizer::new(Arc::new(fonts), RasterizerOptions::default());

        let first = rasterizer.rasterize('M', FontStyle::Normal).unwrap();
        assert!(first.width > 0 && first.height > 0);
        assert_eq!(first.coverage.len(), (first.width * first.height) as usize);

        let second = rasterizer.rasterize('M', FontStyle::Normal).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(rasterizer.cached_glyphs(), 1);
    }

    #[test]
    fn test_thresholded_masks_are_binary() {
        let Ok(fonts) = FontManager::new(None, None) else {
            return;
        };
        let options = RasterizerOptions {
            antialias: false,
            ..RasterizerOptions::default()
        };
        let rasterizer = SwashRasterizer::new(Arc::new(fonts), options);
        let mask = rasterizer.rasterize('g', FontStyle::Normal).unwrap();
        assert!(mask.coverage.iter().all(|&a| a == 0 || a == 255));
    }
}
