/// core-lib/src/bus.rs
use crate::mmu::Tile;
use crate::ppu::color::Palette;

/// Memory access seam shared by the CPU, timer and PPU.
///
/// Every unit is handed the bus for the duration of a call; nothing keeps a
/// reference to it between steps.
pub trait MemoryBus {
    /// Read a byte. Reads never fail.
    fn read_byte(&self, addr: u16) -> u8;

    /// Guest-visible write, including the address-range side effects.
    fn write_byte(&mut self, addr: u16, value: u8);

    /// Store a byte without triggering any write side effect.
    ///
    /// Hardware units use this for registers they own (DIV, TIMA, LY, STAT)
    /// so guest write rules such as "writing DIV resets it" do not apply.
    fn poke(&mut self, addr: u16, value: u8);

    /// Read a 16-bit value from memory in little-endian format
    fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr);
        let hi = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Write a 16-bit value to memory in little-endian format
    fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }

    /// Returns true once after the guest wrote to DIV, then clears the latch.
    fn take_div_reset(&mut self) -> bool {
        false
    }

    /// Decoded 8x8 tile from the tile cache (384 entries).
    fn tile(&self, index: usize) -> &Tile;

    /// Background palette resolved from BGP.
    fn bg_palette(&self) -> &Palette;

    /// Sprite palette 0 (OBP0) or 1 (OBP1).
    fn sprite_palette(&self, which: usize) -> &Palette;
}
