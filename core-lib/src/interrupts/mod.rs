/// core-lib/src/interrupts/mod.rs
use crate::bus::MemoryBus;

/// Interrupt Enable (IE) register
pub const IE_ADDR: u16 = 0xFFFF;
/// Interrupt Flag (IF) register
pub const IF_ADDR: u16 = 0xFF0F;

/// Interrupt bit positions, shared by IE and IF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptFlag {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl InterruptFlag {
    /// All sources, highest priority first
    pub const ALL: [Self; 5] = [
        Self::VBlank,
        Self::LcdStat,
        Self::Timer,
        Self::Serial,
        Self::Joypad,
    ];

    pub const fn mask(self) -> u8 {
        1 << self as u8
    }

    /// Handler address: 0x40, 0x48, 0x50, 0x58, 0x60
    pub const fn vector(self) -> u16 {
        0x40 + 8 * self as u16
    }
}

/// IE/IF bookkeeping over any bus; both registers live in plain memory.
pub trait Interrupts {
    /// Set the IF bit for `flag`
    fn request_interrupt(&mut self, flag: InterruptFlag);

    /// Clear the IF bit for `flag`
    fn clear_interrupt(&mut self, flag: InterruptFlag);

    /// `IE & IF`, restricted to the five defined sources
    fn pending_interrupts(&self) -> u8;

    /// Highest priority interrupt that is both enabled and requested
    fn next_interrupt(&self) -> Option<InterruptFlag> {
        let pending = self.pending_interrupts();
        InterruptFlag::ALL
            .into_iter()
            .find(|flag| pending & flag.mask() != 0)
    }
}

impl<B: MemoryBus + ?Sized> Interrupts for B {
    fn request_interrupt(&mut self, flag: InterruptFlag) {
        let flags = self.read_byte(IF_ADDR);
        self.write_byte(IF_ADDR, flags | flag.mask());
    }

    fn clear_interrupt(&mut self, flag: InterruptFlag) {
        let flags = self.read_byte(IF_ADDR);
        self.write_byte(IF_ADDR, flags & !flag.mask());
    }

    fn pending_interrupts(&self) -> u8 {
        self.read_byte(IE_ADDR) & self.read_byte(IF_ADDR) & 0x1F
    }
}
