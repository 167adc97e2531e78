/// core-lib/src/mmu/mod.rs
use crate::bus::MemoryBus;
use crate::cartridge::{Cartridge, CartridgeError, LOGO_ADDR, NINTENDO_LOGO};
use crate::helpers::extract_colour_index;
use crate::interrupts::{InterruptFlag, Interrupts};
use crate::ppu::color::{Color, Palette};
use crate::ppu::{BGP_ADDR, DMA_ADDR, LY_ADDR, OBP0_ADDR, OBP1_ADDR, STAT_ADDR};
use crate::timer::DIV_ADDR;
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

pub mod input;
pub use input::{GameBoyButton, Joypad};

pub const MEMORY_SIZE: usize = 0x1_0000;
pub const BOOT_ROM_SIZE: usize = 0x100;
pub const TILE_COUNT: usize = 384;

pub const JOYPAD_ADDR: u16 = 0xFF00;
pub const BOOT_OFF_ADDR: u16 = 0xFF50;
pub const OAM_START: u16 = 0xFE00;
pub const OAM_LEN: u16 = 0xA0;
pub const TILE_DATA_START: u16 = 0x8000;
pub const TILE_DATA_END: u16 = 0x97FF;

/// One decoded tile: 8 rows of 8 two-bit colour indices
pub type Tile = [[u8; 8]; 8];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MmuError {
    #[error("boot ROM is {0} bytes, the boot region holds at most 256")]
    BootRomTooLarge(usize),
    #[error("cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),
}

/// Flat 64 KiB bus with the DMG's write side effects
///
/// Besides the raw bytes the MMU owns two derived caches, the decoded tile set
/// and the resolved palettes, which are refreshed on every write that touches
/// their source bytes.
pub struct MMU {
    memory: Box<[u8]>,
    tiles: Box<[Tile]>,
    bg_palette: Palette,
    sprite_palettes: [Palette; 2],
    joypad: Joypad,
    /// Cartridge bytes hidden under the boot ROM while it is mapped
    cartridge_head: [u8; BOOT_ROM_SIZE],
    boot_mapped: bool,
    div_reset: bool,
}

impl Default for MMU {
    fn default() -> Self {
        Self::new()
    }
}

impl MMU {
    pub fn new() -> Self {
        Self {
            memory: vec![0; MEMORY_SIZE].into_boxed_slice(),
            tiles: vec![[[0; 8]; 8]; TILE_COUNT].into_boxed_slice(),
            bg_palette: remap_palette(0),
            sprite_palettes: [remap_palette(0); 2],
            joypad: Joypad::new(),
            cartridge_head: [0xFF; BOOT_ROM_SIZE],
            boot_mapped: false,
            div_reset: false,
        }
    }

    /// Copy the boot image to 0x0000 and the logo to 0x0104.
    ///
    /// The image stays mapped until the guest writes a non-zero value to 0xFF50.
    #[instrument(level = "debug", skip_all, fields(len = boot.len()))]
    pub fn load_boot_rom(&mut self, boot: &[u8]) -> Result<(), MmuError> {
        if boot.len() > BOOT_ROM_SIZE {
            return Err(MmuError::BootRomTooLarge(boot.len()));
        }
        self.memory[..boot.len()].copy_from_slice(boot);
        let logo = usize::from(LOGO_ADDR);
        self.memory[logo..logo + NINTENDO_LOGO.len()].copy_from_slice(&NINTENDO_LOGO);
        self.boot_mapped = true;
        info!(bytes = boot.len(), "Boot ROM mapped at 0x0000");
        Ok(())
    }

    /// Map a flat cartridge image at 0x0000. Bytes under a mapped boot ROM are
    /// kept aside and become visible once the boot ROM is switched off.
    #[instrument(level = "debug", skip_all)]
    pub fn load_cartridge(&mut self, cartridge: &Cartridge) {
        let data = cartridge.data();
        let head = data.len().min(BOOT_ROM_SIZE);
        self.cartridge_head = [0xFF; BOOT_ROM_SIZE];
        self.cartridge_head[..head].copy_from_slice(&data[..head]);
        let start = if self.boot_mapped { head } else { 0 };
        self.memory[start..data.len()].copy_from_slice(&data[start..]);
        info!(title = %cartridge.title(), bytes = data.len(), "Cartridge mapped");
    }

    /// Convenience wrapper around [`Cartridge::new`] and [`MMU::load_cartridge`]
    pub fn load_cartridge_bytes(&mut self, rom: Vec<u8>) -> Result<(), MmuError> {
        let cartridge = Cartridge::new(rom)?;
        self.load_cartridge(&cartridge);
        Ok(())
    }

    pub const fn boot_rom_mapped(&self) -> bool {
        self.boot_mapped
    }

    /// I/O state left behind by the boot firmware, for starting at 0x0100.
    pub fn post_boot(&mut self) {
        self.write_byte(0xFF40, 0x91);
        self.write_byte(BGP_ADDR, 0xFC);
        self.write_byte(OBP0_ADDR, 0xFF);
        self.write_byte(OBP1_ADDR, 0xFF);
        self.write_byte(BOOT_OFF_ADDR, 0x01);
    }

    /// Press or release a button; a press raises the joypad interrupt.
    pub fn set_button(&mut self, button: GameBoyButton, pressed: bool) {
        if self.joypad.set_button(button, pressed) {
            trace!(?button, "Joypad press");
            self.request_interrupt(InterruptFlag::Joypad);
        }
    }

    fn store(&mut self, addr: u16, value: u8) {
        if let Some(slot) = self.memory.get_mut(usize::from(addr)) {
            *slot = value;
        }
    }

    fn load(&self, addr: u16) -> u8 {
        self.memory.get(usize::from(addr)).copied().unwrap_or(0xFF)
    }

    fn dma_transfer(&mut self, page: u8) {
        let source = u16::from(page) << 8;
        trace!(source = format_args!("{source:#06X}"), "OAM DMA");
        for offset in 0..OAM_LEN {
            let byte = self.read_byte(source.wrapping_add(offset));
            self.store(OAM_START + offset, byte);
        }
    }

    /// Recompute the tile row that contains `addr` from its two plane bytes
    fn update_tile(&mut self, addr: u16) {
        let base = addr & 0xFFFE;
        let offset = usize::from(base - TILE_DATA_START);
        let low = self.load(base);
        let high = self.load(base + 1);
        let tile = offset / 16;
        let row = (offset % 16) / 2;
        if let Some(tile) = self.tiles.get_mut(tile) {
            for (x, pixel) in tile[row].iter_mut().enumerate() {
                *pixel = extract_colour_index(low, high, 7 - x as u8);
            }
        }
    }

    fn unmap_boot_rom(&mut self) {
        self.memory[..BOOT_ROM_SIZE].copy_from_slice(&self.cartridge_head);
        self.boot_mapped = false;
        debug!("Boot ROM unmapped");
    }
}

/// Map the four colour indices through a palette register (2 bits per index).
pub fn remap_palette(value: u8) -> Palette {
    std::array::from_fn(|index| Color::from_palette(index as u8, value))
}

impl MemoryBus for MMU {
    fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            JOYPAD_ADDR => self.joypad.read(),
            _ => self.load(addr),
        }
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        match addr {
            DMA_ADDR => {
                self.store(addr, value);
                self.dma_transfer(value);
            }
            TILE_DATA_START..=TILE_DATA_END => {
                self.store(addr, value);
                self.update_tile(addr);
            }
            BGP_ADDR => {
                self.store(addr, value);
                self.bg_palette = remap_palette(value);
            }
            OBP0_ADDR => {
                self.store(addr, value);
                self.sprite_palettes[0] = remap_palette(value);
            }
            OBP1_ADDR => {
                self.store(addr, value);
                self.sprite_palettes[1] = remap_palette(value);
            }
            DIV_ADDR => {
                self.store(addr, 0);
                self.div_reset = true;
            }
            STAT_ADDR => {
                // mode and coincidence bits are owned by the PPU
                let status = self.load(addr) & 0x07;
                self.store(addr, (value & 0x78) | status);
            }
            LY_ADDR => {}
            JOYPAD_ADDR => {
                self.joypad.write(value);
                self.store(addr, self.joypad.read());
            }
            BOOT_OFF_ADDR => {
                if value != 0 && self.boot_mapped {
                    self.unmap_boot_rom();
                }
                self.store(addr, value);
            }
            _ => self.store(addr, value),
        }
    }

    fn poke(&mut self, addr: u16, value: u8) {
        self.store(addr, value);
    }

    fn take_div_reset(&mut self) -> bool {
        std::mem::take(&mut self.div_reset)
    }

    fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index % TILE_COUNT]
    }

    fn bg_palette(&self) -> &Palette {
        &self.bg_palette
    }

    fn sprite_palette(&self, which: usize) -> &Palette {
        &self.sprite_palettes[which & 1]
    }
}

#[cfg(test)]
mod tests;
