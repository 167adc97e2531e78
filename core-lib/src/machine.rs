//! The assembled machine: a CPU (with its timer and PPU) plus the bus.
//!
//! This is the surface a front end drives. It steps the CPU, hands out the
//! finished frame and feeds joypad input; the front end decides when to
//! pause or stop through [`RunSignal`].

use crate::cpu::{CpuError, CPU};
use crate::mmu::{GameBoyButton, MmuError, MMU};
use crate::ppu::{Color, CYCLES_PER_FRAME};
use tracing::{debug, info, instrument};

/// What the front end wants the run loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSignal {
    Run,
    /// Skip stepping but keep polling
    Pause,
    Quit,
}

#[derive(Default)]
pub struct GameBoy {
    pub cpu: CPU,
    pub mmu: MMU,
}

impl GameBoy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Power on with `boot` mapped at 0x0000 and PC at 0
    #[instrument(skip(boot), fields(len = boot.len()))]
    pub fn with_boot_rom(boot: &[u8]) -> Result<Self, MmuError> {
        let mut gb = Self::new();
        gb.mmu.load_boot_rom(boot)?;
        info!("Boot ROM loaded");
        Ok(gb)
    }

    /// Map a flat ROM-only cartridge image
    pub fn load_cartridge(&mut self, rom: Vec<u8>) -> Result<(), MmuError> {
        self.mmu.load_cartridge_bytes(rom)
    }

    /// Jump straight to 0x0100 with the register and I/O state the boot
    /// firmware would have left.
    pub fn skip_boot(&mut self) {
        debug!("Skipping boot ROM");
        self.cpu.post_boot();
        self.mmu.post_boot();
    }

    /// One CPU step. Returns the T-cycles it took.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        self.cpu.step(&mut self.mmu)
    }

    /// Step until the PPU completes a frame. With the LCD off no frame ever
    /// completes, so the call returns after one frame's worth of cycles.
    pub fn run_frame(&mut self) -> Result<u32, CpuError> {
        let mut elapsed = 0;
        loop {
            elapsed += self.step()?;
            if self.cpu.ppu.take_frame_ready() {
                return Ok(elapsed);
            }
            if !self.cpu.ppu.lcd_enabled() && elapsed >= CYCLES_PER_FRAME {
                return Ok(elapsed);
            }
        }
    }

    /// The last completed frame, 160x144, row-major
    pub fn frame(&self) -> &[Color] {
        self.cpu.ppu.frame()
    }

    pub fn set_button(&mut self, button: GameBoyButton, pressed: bool) {
        self.mmu.set_button(button, pressed);
    }

    /// Drive the machine until `poll` returns [`RunSignal::Quit`].
    ///
    /// `poll` is called once before every step and sees the machine as it is
    /// between instructions. Returns the cycles executed by this call.
    pub fn run(&mut self, mut poll: impl FnMut(&Self) -> RunSignal) -> Result<u64, CpuError> {
        let mut cycles = 0u64;
        loop {
            match poll(self) {
                RunSignal::Quit => {
                    debug!(cycles, "Run loop stopped");
                    return Ok(cycles);
                }
                RunSignal::Pause => {}
                RunSignal::Run => cycles += u64::from(self.step()?),
            }
        }
    }
}

#[cfg(test)]
mod tracing_init {
    use std::sync::Once;
    static INIT: Once = Once::new();
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });
    }
}
