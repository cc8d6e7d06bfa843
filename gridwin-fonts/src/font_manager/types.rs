//! Font data types for font management.

use std::sync::Arc;
use swash::FontRef;

/// Stores font data with lifetime management.
///
/// This struct owns the font data bytes and provides a `FontRef` that can be used
/// for glyph lookups and rasterization. The `FontRef` is guaranteed to be valid
/// for the lifetime of this struct.
#[derive(Clone)]
pub struct FontData {
    /// Raw font data bytes (TTF/OTF)
    pub data: Arc<Vec<u8>>,
    /// Swash font reference for glyph operations
    pub font_ref: FontRef<'static>,
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FontData {
    /// Create a new FontData from bytes using face index 0.
    ///
    /// Returns `None` if the bytes are not a parseable font.
    pub fn new(data: Vec<u8>) -> Option<Self> {
        Self::new_with_index(data, 0)
    }

    /// Create a new FontData from bytes with a specific face index.
    ///
    /// TrueType Collections (.ttc) hold several faces in one blob; `face_index`
    /// selects which one.
    pub fn new_with_index(data: Vec<u8>, face_index: usize) -> Option<Self> {
        let data_arc = Arc::new(data);

        // SAFETY: the bytes live in the Arc stored alongside the FontRef, and the
        // Vec is never mutated or reallocated, so the slice stays valid for as
        // long as this FontData (or any clone of it) exists.
        let font_ref = unsafe {
            let bytes = data_arc.as_slice();
            let static_bytes: &'static [u8] = std::mem::transmute(bytes);
            FontRef::from_index(static_bytes, face_index)?
        };

        Some(FontData {
            data: data_arc,
            font_ref,
        })
    }

    /// Glyph id for `ch`, or `None` when the face has no mapping for it.
    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        match self.font_ref.charmap().map(ch) {
            0 => None,
            id => Some(id),
        }
    }
}
