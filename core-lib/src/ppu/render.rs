use super::color::Color;
use super::lcdc::LcdControl;
use super::ppu::Ppu;
use super::sprite::{sprites_on_line, SpriteAttributes};
use super::{
    LCDC_ADDR, LY_ADDR, SCREEN_WIDTH, SCX_ADDR, SCY_ADDR, TILEMAP_HIGH, TILEMAP_LOW, WX_ADDR,
    WY_ADDR,
};
use crate::bus::MemoryBus;
use crate::helpers::tile_cache_index;

/// Rightmost WX for which the window is still on screen
const WX_MAX: u8 = 166;

impl Ppu {
    /// Compose the current line (LY) into the frame buffer: background,
    /// then window, then sprites.
    pub(crate) fn render_scanline(&mut self, bus: &dyn MemoryBus) {
        let ly = bus.read_byte(LY_ADDR);
        let lcdc = LcdControl::from_bits_truncate(bus.read_byte(LCDC_ADDR));
        let start = usize::from(ly) * SCREEN_WIDTH;
        let Some(row) = self.frame_buffer.get_mut(start..start + SCREEN_WIDTH) else {
            return;
        };

        if lcdc.contains(LcdControl::BG_WINDOW_ENABLE) {
            let scx = bus.read_byte(SCX_ADDR);
            let scy = bus.read_byte(SCY_ADDR);
            let map = tilemap_base(lcdc.contains(LcdControl::BG_TILEMAP));
            let y = ly.wrapping_add(scy);
            for (x, index) in self.line_indices.iter_mut().enumerate() {
                *index = tile_pixel(bus, lcdc, map, (x as u8).wrapping_add(scx), y);
            }
            if lcdc.contains(LcdControl::WINDOW_ENABLE) {
                let wy = bus.read_byte(WY_ADDR);
                let wx = bus.read_byte(WX_ADDR);
                if ly >= wy && wx <= WX_MAX {
                    let map = tilemap_base(lcdc.contains(LcdControl::WINDOW_TILEMAP));
                    let left = usize::from(wx.saturating_sub(7));
                    // WX < 7 scrolls the window's first column off the left edge
                    let skip = 7u8.saturating_sub(wx);
                    for (x, index) in self.line_indices.iter_mut().enumerate().skip(left) {
                        let wx_pos = (x - left) as u8 + skip;
                        *index = tile_pixel(bus, lcdc, map, wx_pos, self.window_line);
                    }
                    self.window_line = self.window_line.wrapping_add(1);
                }
            }
            let palette = bus.bg_palette();
            for (pixel, &index) in row.iter_mut().zip(self.line_indices.iter()) {
                *pixel = palette[usize::from(index)];
            }
        } else {
            self.line_indices.fill(0);
            row.fill(Color::WHITE);
        }

        if lcdc.contains(LcdControl::SPRITE_ENABLE) {
            draw_sprites(bus, lcdc, ly, row, &self.line_indices);
        }
    }
}

const fn tilemap_base(high: bool) -> u16 {
    if high {
        TILEMAP_HIGH
    } else {
        TILEMAP_LOW
    }
}

/// Colour index at (x, y) of a 256x256 tile map layer
fn tile_pixel(bus: &dyn MemoryBus, lcdc: LcdControl, map: u16, x: u8, y: u8) -> u8 {
    let map_addr = map + u16::from(y / 8) * 32 + u16::from(x / 8);
    let tile_id = bus.read_byte(map_addr);
    let signed = !lcdc.contains(LcdControl::BG_WINDOW_TILE_DATA);
    let tile = bus.tile(tile_cache_index(tile_id, signed));
    tile[usize::from(y % 8)][usize::from(x % 8)]
}

/// Overlay up to ten sprites on one line. Sprites are drawn lowest priority
/// first so the highest priority sprite ends up on top.
fn draw_sprites(bus: &dyn MemoryBus, lcdc: LcdControl, ly: u8, row: &mut [Color], bg: &[u8]) {
    let tall = lcdc.contains(LcdControl::SPRITE_SIZE);
    let height = if tall { 16 } else { 8 };

    for sprite in sprites_on_line(bus, ly, height).iter().rev() {
        let mut line = (i16::from(ly) - sprite.top()) as u8;
        if sprite.attributes.contains(SpriteAttributes::Y_FLIP) {
            line = height - 1 - line;
        }
        let tile_id = if tall { sprite.tile_idx & 0xFE } else { sprite.tile_idx };
        let tile = bus.tile(usize::from(tile_id) + usize::from(line / 8));
        let palette = bus.sprite_palette(sprite.palette());
        let behind_bg = sprite.attributes.contains(SpriteAttributes::BEHIND_BG);

        for col in 0..8u8 {
            let x = sprite.left() + i16::from(col);
            let Ok(x) = usize::try_from(x) else {
                continue;
            };
            if x >= SCREEN_WIDTH {
                break;
            }
            let tile_col = if sprite.attributes.contains(SpriteAttributes::X_FLIP) {
                7 - col
            } else {
                col
            };
            let index = tile[usize::from(line % 8)][usize::from(tile_col)];
            if index == 0 || (behind_bg && bg[x] != 0) {
                continue;
            }
            row[x] = palette[usize::from(index)];
        }
    }
}
