use super::{MAX_SPRITES_PER_LINE, OAM_ADDR, OAM_SPRITES};
use crate::bus::MemoryBus;
use bitflags::bitflags;

bitflags! {
    /// OAM attribute byte (DMG bits only)
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct SpriteAttributes: u8 {
        /// Drawn behind background colours 1-3
        const BEHIND_BG = 0x80;
        const Y_FLIP    = 0x40;
        const X_FLIP    = 0x20;
        /// 0 = OBP0, 1 = OBP1
        const PALETTE   = 0x10;
    }
}

/// Sprite object representation with position and attributes.
///
/// Each sprite in OAM is 4 bytes:
/// - Byte 0: Y position plus 16
/// - Byte 1: X position plus 8
/// - Byte 2: Tile index (unsigned, from 0x8000)
/// - Byte 3: Attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    /// Position in OAM (0-39), lower wins ties
    pub oam_index: usize,
    pub y_pos: u8,
    pub x_pos: u8,
    pub tile_idx: u8,
    pub attributes: SpriteAttributes,
}

impl Sprite {
    /// Off-screen placeholder for unused scan slots
    const HIDDEN: Self = Self {
        oam_index: 0,
        y_pos: 0,
        x_pos: 0,
        tile_idx: 0,
        attributes: SpriteAttributes::empty(),
    };

    pub fn from_oam(bus: &dyn MemoryBus, oam_index: usize) -> Self {
        let base = OAM_ADDR + (oam_index as u16) * 4;
        Self {
            oam_index,
            y_pos: bus.read_byte(base),
            x_pos: bus.read_byte(base + 1),
            tile_idx: bus.read_byte(base + 2),
            attributes: SpriteAttributes::from_bits_truncate(bus.read_byte(base + 3)),
        }
    }

    /// Screen Y of the sprite's top row
    pub const fn top(&self) -> i16 {
        self.y_pos as i16 - 16
    }

    /// Screen X of the sprite's leftmost column
    pub const fn left(&self) -> i16 {
        self.x_pos as i16 - 8
    }

    pub const fn palette(&self) -> usize {
        if self.attributes.contains(SpriteAttributes::PALETTE) {
            1
        } else {
            0
        }
    }

    pub const fn covers_line(&self, line: u8, height: u8) -> bool {
        let line = line as i16;
        line >= self.top() && line < self.top() + height as i16
    }
}

/// Sprites picked by one OAM scan, highest priority first
#[derive(Debug, Clone, Copy)]
pub struct LineSprites {
    sprites: [Sprite; MAX_SPRITES_PER_LINE],
    len: usize,
}

impl LineSprites {
    const fn new() -> Self {
        Self {
            sprites: [Sprite::HIDDEN; MAX_SPRITES_PER_LINE],
            len: 0,
        }
    }

    /// False once the per-line limit is reached
    fn push(&mut self, sprite: Sprite) -> bool {
        let Some(slot) = self.sprites.get_mut(self.len) else {
            return false;
        };
        *slot = sprite;
        self.len += 1;
        true
    }
}

impl std::ops::Deref for LineSprites {
    type Target = [Sprite];

    fn deref(&self) -> &[Sprite] {
        &self.sprites[..self.len]
    }
}

/// OAM scan for one line: the first ten sprites (in OAM order) that cover
/// `line`, then sorted so the highest priority sprite comes first
/// (smaller X, then lower OAM index). Runs without allocating.
pub fn sprites_on_line(bus: &dyn MemoryBus, line: u8, height: u8) -> LineSprites {
    let mut selected = LineSprites::new();
    for index in 0..OAM_SPRITES {
        let sprite = Sprite::from_oam(bus, index);
        if sprite.covers_line(line, height) && !selected.push(sprite) {
            break;
        }
    }
    let len = selected.len;
    selected.sprites[..len].sort_unstable_by_key(|sprite| (sprite.x_pos, sprite.oam_index));
    selected
}
