//! Font management with a fallback chain.
//!
//! This module provides font loading and glyph lookup. It supports:
//! - A regular face with an optional bold variant
//! - Automatic fallback chain for code points the primary faces lack

mod fallbacks;
mod loader;
mod types;

use fontdb::{Database, Weight};
use swash::FontRef;

use crate::error::FontError;
use crate::rasterizer::FontStyle;

pub use fallbacks::{FALLBACK_FAMILIES, MONOSPACE_FAMILIES};
pub use types::FontData;

/// Owns the loaded faces and resolves `(char, FontStyle)` to a face + glyph id.
pub struct FontManager {
    /// Regular weight face
    regular: FontData,

    /// Bold face (falls back to regular when absent)
    bold: Option<FontData>,

    /// Fallback faces in priority order
    fallbacks: Vec<FontData>,
}

impl FontManager {
    /// Load faces from the system font database.
    ///
    /// # Arguments
    /// * `regular_family` - Regular face family; `None` picks the first
    ///   available family from [`MONOSPACE_FAMILIES`]
    /// * `bold_family` - Bold face family; `None` asks for the bold weight of
    ///   the regular family
    pub fn new(regular_family: Option<&str>, bold_family: Option<&str>) -> Result<Self, FontError> {
        let mut font_db = Database::new();
        font_db.load_system_fonts();
        log::info!("Loaded {} system fonts", font_db.len());

        let (regular, regular_name) = Self::load_regular(&font_db, regular_family)?;

        let bold_name = bold_family.unwrap_or(regular_name.as_str());
        let bold = loader::load_font_from_db(&font_db, bold_name, Weight::BOLD);
        if bold.is_some() {
            log::info!("Loaded bold font: {}", bold_name);
        } else {
            log::warn!("Bold font '{}' not found, will use regular font", bold_name);
        }

        let fallbacks: Vec<FontData> = FALLBACK_FAMILIES
            .iter()
            .filter_map(|family| {
                let font = loader::load_font_from_db(&font_db, family, Weight::NORMAL)?;
                log::debug!("Added fallback font: {}", family);
                Some(font)
            })
            .collect();
        log::info!("Loaded {} fallback fonts", fallbacks.len());

        Ok(Self {
            regular,
            bold,
            fallbacks,
        })
    }

    /// Build a manager from already-loaded faces, with no fallback chain.
    pub fn from_fonts(regular: FontData, bold: Option<FontData>) -> Self {
        Self {
            regular,
            bold,
            fallbacks: Vec::new(),
        }
    }

    fn load_regular(
        font_db: &Database,
        family: Option<&str>,
    ) -> Result<(FontData, String), FontError> {
        if let Some(family_name) = family {
            log::info!("Attempting to load primary font: {}", family_name);
            if let Some(font) = loader::load_font_from_db(font_db, family_name, Weight::NORMAL) {
                log::info!("Successfully loaded primary font: {}", family_name);
                return Ok((font, family_name.to_string()));
            }
            log::warn!(
                "Primary font '{}' not found, trying monospace fallbacks",
                family_name
            );
        }

        for family_name in MONOSPACE_FAMILIES {
            if let Some(font) = loader::load_font_from_db(font_db, family_name, Weight::NORMAL) {
                log::info!("Using monospace font: {}", family_name);
                return Ok((font, family_name.to_string()));
            }
        }

        if let Some(font) = loader::load_generic_monospace(font_db, Weight::NORMAL) {
            log::info!("Using generic monospace font");
            return Ok((font, "monospace".to_string()));
        }

        let mut tried: Vec<&str> = family.into_iter().collect();
        tried.extend(MONOSPACE_FAMILIES.iter().copied());
        tried.push("monospace");
        Err(FontError::NoFont {
            tried: tried.join(", "),
        })
    }

    /// Face to try first for `style`.
    fn styled_font(&self, style: FontStyle) -> &FontData {
        match style {
            FontStyle::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontStyle::Normal => &self.regular,
        }
    }

    /// Find a glyph for a character across the face chain.
    ///
    /// Lookup order: styled face, regular face, fallbacks.
    pub fn find_glyph(&self, ch: char, style: FontStyle) -> Option<(FontRef<'static>, u16)> {
        let styled = self.styled_font(style);
        if let Some(id) = styled.glyph_id(ch) {
            return Some((styled.font_ref, id));
        }

        if style != FontStyle::Normal
            && let Some(id) = self.regular.glyph_id(ch)
        {
            return Some((self.regular.font_ref, id));
        }

        for fallback in &self.fallbacks {
            if let Some(id) = fallback.glyph_id(ch) {
                log::debug!(
                    "Character '{}' (U+{:04X}) found in fallback font",
                    ch,
                    ch as u32
                );
                return Some((fallback.font_ref, id));
            }
        }

        log::debug!(
            "Character '{}' (U+{:04X}) not found in any of {} fonts",
            ch,
            ch as u32,
            self.font_count()
        );
        None
    }

    pub fn has_bold(&self) -> bool {
        self.bold.is_some()
    }

    /// Total number of loaded faces.
    pub fn font_count(&self) -> usize {
        1 + usize::from(self.bold.is_some()) + self.fallbacks.len()
    }
}
