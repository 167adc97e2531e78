/// core-lib/src/ppu/color.rs
/// An RGB triple as handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Four resolved colours, indexed by a 2-bit colour index
pub type Palette = [Color; 4];

impl Color {
    /// Lightest shade (shade 0)
    pub const WHITE: Self = Self::grey(0xFF);
    pub const LIGHT_GRAY: Self = Self::grey(0xAA);
    pub const DARK_GRAY: Self = Self::grey(0x55);
    /// Darkest shade (shade 3)
    pub const BLACK: Self = Self::grey(0x00);

    /// The four fixed DMG shades, lightest first
    pub const SHADES: [Self; 4] = [Self::WHITE, Self::LIGHT_GRAY, Self::DARK_GRAY, Self::BLACK];

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn grey(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// Convert a Game Boy color index (0-3) to a shade using the given palette
    ///
    /// The palette is an 8-bit value where:
    /// - Bits 0-1: Shade for index 0
    /// - Bits 2-3: Shade for index 1
    /// - Bits 4-5: Shade for index 2
    /// - Bits 6-7: Shade for index 3
    pub const fn from_palette(color_idx: u8, palette: u8) -> Self {
        let shift = (color_idx & 0x3) << 1;
        let shade = (palette >> shift) & 0x3;
        Self::SHADES[shade as usize]
    }

    pub const fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}
