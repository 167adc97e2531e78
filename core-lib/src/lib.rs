//! DMG Game Boy emulation kernel.
//!
//! The CPU drives everything: each [`CPU::step`] executes one instruction
//! against a [`MemoryBus`], then advances the [`Timer`] and [`Ppu`] by the
//! same number of T-cycles and services interrupts. [`GameBoy`] bundles the
//! CPU with the [`MMU`] for front ends.

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod helpers;
pub mod interrupts;
pub mod machine;
pub mod mmu;
pub mod ppu;
pub mod timer;

// Re-export common types
pub use bus::MemoryBus;
pub use cartridge::Cartridge;
pub use cpu::{CpuError, CPU};
pub use interrupts::{InterruptFlag, Interrupts};
pub use machine::{GameBoy, RunSignal};
pub use mmu::{GameBoyButton, MmuError, MMU};
pub use ppu::{Color, Ppu, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use timer::Timer;
