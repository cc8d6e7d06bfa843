//! Default values for font and glyph rasterization settings.

pub fn font_size() -> f32 {
    18.0
}

pub fn glyph_cache_entries() -> usize {
    2048
}

pub fn font_antialias() -> bool {
    true
}

pub fn font_hinting() -> bool {
    true
}
