/// core-lib/src/ppu/mod.rs
#[allow(clippy::module_inception)]
pub mod ppu;
pub use ppu::Ppu;

pub mod color;
pub use color::{Color, Palette};

mod render;
pub mod sprite;
pub use sprite::{LineSprites, Sprite, SpriteAttributes};

/// LCDC (0xFF40)
pub mod lcdc {
    use bitflags::bitflags;

    bitflags! {
        #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
        pub struct LcdControl: u8 {
            /// PPU runs; clearing it blanks the screen and parks LY at 0
            const LCD_ENABLE          = 1 << 7;
            /// Window map at 0x9C00 instead of 0x9800
            const WINDOW_TILEMAP      = 1 << 6;
            const WINDOW_ENABLE       = 1 << 5;
            /// Unsigned tile numbers from 0x8000; when clear, signed from 0x9000
            const BG_WINDOW_TILE_DATA = 1 << 4;
            /// Background map at 0x9C00 instead of 0x9800
            const BG_TILEMAP          = 1 << 3;
            /// 8x16 sprites
            const SPRITE_SIZE         = 1 << 2;
            const SPRITE_ENABLE       = 1 << 1;
            /// Background and window both off when clear (DMG)
            const BG_WINDOW_ENABLE    = 1;
        }
    }
}

/// STAT (0xFF41). Bits 0-2 belong to the PPU, bits 3-6 to the guest.
pub mod stat {
    use bitflags::bitflags;

    bitflags! {
        #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
        pub struct LcdStatus: u8 {
            const LYC_INTERRUPT    = 1 << 6;
            const OAM_INTERRUPT    = 1 << 5;
            const VBLANK_INTERRUPT = 1 << 4;
            const HBLANK_INTERRUPT = 1 << 3;
            /// Set while LY == LYC
            const LYC_EQUAL_LY     = 1 << 2;
            const MODE_FLAG_MASK   = 0b11;
        }
    }
}

/// Scanline phase, numbered as reported in STAT bits 0-1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    PixelTransfer = 3,
}

impl PpuMode {
    pub const fn from_stat_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::HBlank,
            1 => Self::VBlank,
            2 => Self::OamSearch,
            _ => Self::PixelTransfer,
        }
    }

    /// T-cycles spent in the mode. VBlank counts per line.
    pub const fn duration(self) -> u32 {
        match self {
            Self::OamSearch => 80,
            Self::PixelTransfer => 172,
            Self::HBlank => 204,
            Self::VBlank => CYCLES_PER_LINE,
        }
    }

    /// STAT enable bit that raises LCD STAT on entry, if the mode has one
    pub const fn stat_interrupt(self) -> Option<stat::LcdStatus> {
        match self {
            Self::HBlank => Some(stat::LcdStatus::HBLANK_INTERRUPT),
            Self::VBlank => Some(stat::LcdStatus::VBLANK_INTERRUPT),
            Self::OamSearch => Some(stat::LcdStatus::OAM_INTERRUPT),
            Self::PixelTransfer => None,
        }
    }
}

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;
pub const CYCLES_PER_LINE: u32 = 456;
pub const LINES_PER_FRAME: u8 = 154;
pub const CYCLES_PER_FRAME: u32 = CYCLES_PER_LINE * LINES_PER_FRAME as u32;
pub const OAM_SPRITES: usize = 40;
pub const MAX_SPRITES_PER_LINE: usize = 10;

// I/O registers
pub const LCDC_ADDR: u16 = 0xFF40;
pub const STAT_ADDR: u16 = 0xFF41;
pub const SCY_ADDR: u16 = 0xFF42;
pub const SCX_ADDR: u16 = 0xFF43;
pub const LY_ADDR: u16 = 0xFF44;
pub const LYC_ADDR: u16 = 0xFF45;
pub const DMA_ADDR: u16 = 0xFF46;
pub const BGP_ADDR: u16 = 0xFF47;
pub const OBP0_ADDR: u16 = 0xFF48;
pub const OBP1_ADDR: u16 = 0xFF49;
pub const WY_ADDR: u16 = 0xFF4A;
pub const WX_ADDR: u16 = 0xFF4B;

pub const OAM_ADDR: u16 = 0xFE00;
pub const TILEMAP_LOW: u16 = 0x9800;
pub const TILEMAP_HIGH: u16 = 0x9C00;
