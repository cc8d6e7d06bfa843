//! 8-bit RGBA colors.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha forced to 255.
    pub const fn with_full_alpha(self) -> Self {
        Self { a: 255, ..self }
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// Blend `src` over `dst` with coverage `alpha`, writing into `dst`.
///
/// Exact at the endpoints: alpha 255 yields `src`, alpha 0 leaves `dst`.
#[inline]
pub(crate) fn blend_over(dst: &mut [u8], src: [u8; 4], alpha: u8) {
    let inv = 255 - alpha;
    for channel in 0..3 {
        let mixed = src[channel] as u32 * alpha as u32 + dst[channel] as u32 * inv as u32;
        dst[channel] = ((mixed + 127) / 255) as u8;
    }
    dst[3] = (alpha as u32 + (dst[3] as u32 * inv as u32 + 127) / 255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_endpoints_are_exact() {
        let mut dst = [10, 20, 30, 255];
        blend_over(&mut dst, [200, 100, 50, 255], 255);
        assert_eq!(dst, [200, 100, 50, 255]);

        let mut dst = [10, 20, 30, 255];
        blend_over(&mut dst, [200, 100, 50, 255], 0);
        assert_eq!(dst, [10, 20, 30, 255]);
    }

    #[test]
    fn test_blend_half() {
        let mut dst = [0, 0, 0, 255];
        blend_over(&mut dst, [255, 255, 255, 255], 128);
        assert_eq!(dst, [128, 128, 128, 255]);
    }

    #[test]
    fn test_full_alpha() {
        assert_eq!(Rgba::new(1, 2, 3, 0).with_full_alpha(), Rgba::opaque(1, 2, 3));
    }
}
