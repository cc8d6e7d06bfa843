use thiserror::Error;

/// Errors from font discovery and glyph rasterization.
#[derive(Debug, Error)]
pub enum FontError {
    /// No requested or fallback monospace face could be loaded.
    #[error("no usable font found (tried: {tried})")]
    NoFont { tried: String },

    /// Neither the styled face, the regular face nor any fallback maps the code point.
    #[error("no glyph for {ch:?} (U+{:04X})", u32::from(*.ch))]
    MissingGlyph { ch: char },

    /// The face maps the code point but swash produced no image for it.
    #[error("could not rasterize glyph for {ch:?} (U+{:04X})", u32::from(*.ch))]
    RenderFailed { ch: char },
}
