//! Font family preference lists.

/// Monospace families tried, in order, when no regular family is configured
/// (or the configured one is missing).
pub const MONOSPACE_FAMILIES: &[&str] = &[
    "DejaVu Sans Mono",
    "JetBrains Mono",
    "Fira Code",
    "Liberation Mono",
    "Noto Sans Mono",
    "Ubuntu Mono",
    "Menlo",
    "Monaco",
    "Consolas",
    "Courier New",
];

/// Fallback families searched when neither the styled nor the regular face
/// has a glyph for a code point.
pub const FALLBACK_FAMILIES: &[&str] = &[
    // CJK
    "Noto Sans CJK JP",
    "Noto Sans CJK SC",
    "Microsoft YaHei",
    "MS Gothic",
    // Symbols
    "Symbols Nerd Font",
    "Noto Sans Symbols",
    "Noto Sans Symbols 2",
    "Apple Symbols",
    "Segoe UI Symbol",
    "DejaVu Sans",
    "Symbola",
    // Emoji
    "Noto Color Emoji",
    "Apple Color Emoji",
    "Segoe UI Emoji",
];
