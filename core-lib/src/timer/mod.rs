/// # Timer Module
///
/// - DIV (0xFF04): upper byte of a free-running 16-bit counter, so it ticks
///   once every 256 T-cycles. Any guest write clears the whole counter.
/// - TIMA (0xFF05): counts at the rate selected by TAC
/// - TMA (0xFF06): reloaded into TIMA when it overflows
/// - TAC (0xFF07): timer control
///   - Bit 2: Timer Enable
///   - Bits 1-0: Input Clock Select
///     - 00: 4096 Hz
///     - 01: 262144 Hz
///     - 10: 65536 Hz
///     - 11: 16384 Hz
///
/// A TIMA overflow reloads TMA and raises interrupt flag bit 2.
use crate::bus::MemoryBus;
use crate::interrupts::{InterruptFlag, Interrupts};
use bitflags::bitflags;
use tracing::{debug, instrument, trace};

pub const DIV_ADDR: u16 = 0xFF04;
pub const TIMA_ADDR: u16 = 0xFF05;
pub const TMA_ADDR: u16 = 0xFF06;
pub const TAC_ADDR: u16 = 0xFF07;

/// DMG master clock in T-cycles per second
pub const CPU_CLOCK_HZ: u32 = 4_194_304;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct TacReg: u8 {
        const TIMER_ENABLE = 0b100;
        const CLOCK_SELECT = 0b011;
    }
}

impl TacReg {
    /// TIMA frequency in Hz for the selected input clock
    pub const fn frequency(self) -> u32 {
        match self.bits() & Self::CLOCK_SELECT.bits() {
            0b00 => 4_096,
            0b01 => 262_144,
            0b10 => 65_536,
            _ => 16_384,
        }
    }

    /// T-cycles between two TIMA increments
    pub const fn period(self) -> u32 {
        CPU_CLOCK_HZ / self.frequency()
    }

    pub const fn enabled(self) -> bool {
        self.contains(Self::TIMER_ENABLE)
    }
}

/// Divider and timer counters, driven by elapsed T-cycles
#[derive(Debug, Default)]
pub struct Timer {
    /// Internal 16-bit divider, DIV is its upper byte
    div_counter: u16,
    /// Cycles accumulated towards the next TIMA increment
    tima_cycles: u32,
}

impl Timer {
    #[instrument(level = "debug")]
    pub fn new() -> Self {
        debug!("Initializing Timer");
        Self::default()
    }

    pub const fn div_counter(&self) -> u16 {
        self.div_counter
    }

    /// Advance by `cycles` T-cycles, updating DIV/TIMA on the bus.
    pub fn step(&mut self, bus: &mut dyn MemoryBus, cycles: u32) {
        if bus.take_div_reset() {
            trace!("DIV reset");
            self.div_counter = 0;
            self.tima_cycles = 0;
        }

        self.div_counter = self.div_counter.wrapping_add(cycles as u16);
        bus.poke(DIV_ADDR, (self.div_counter >> 8) as u8);

        let tac = TacReg::from_bits_truncate(bus.read_byte(TAC_ADDR));
        if !tac.enabled() {
            self.tima_cycles = 0;
            return;
        }

        let period = tac.period();
        self.tima_cycles += cycles;
        while self.tima_cycles >= period {
            self.tima_cycles -= period;
            Self::increment_tima(bus);
        }
    }

    fn increment_tima(bus: &mut dyn MemoryBus) {
        let tima = bus.read_byte(TIMA_ADDR);
        if let Some(next) = tima.checked_add(1) {
            bus.poke(TIMA_ADDR, next);
        } else {
            let tma = bus.read_byte(TMA_ADDR);
            trace!(tma, "TIMA overflow");
            bus.poke(TIMA_ADDR, tma);
            bus.request_interrupt(InterruptFlag::Timer);
        }
    }
}
