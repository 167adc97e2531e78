/// core-lib/src/ppu/ppu.rs
use super::color::Color;
use super::lcdc::LcdControl;
use super::stat::LcdStatus;
use super::{PpuMode, LCDC_ADDR, LINES_PER_FRAME, LYC_ADDR, LY_ADDR, SCREEN_HEIGHT, SCREEN_WIDTH, STAT_ADDR};
use crate::bus::MemoryBus;
use crate::interrupts::{InterruptFlag, Interrupts};
use tracing::{debug, instrument, trace};

/// First line of the vertical blank
pub const VBLANK_LINE: u8 = SCREEN_HEIGHT as u8;

/// Pixel Processing Unit: scanline mode state machine plus frame buffer
///
/// Register state (LCDC, STAT, LY, scroll, palettes) lives on the bus; the
/// PPU only keeps the mode, the dot counter, the window line and the frame.
#[derive(Debug)]
pub struct Ppu {
    pub(crate) mode: PpuMode,
    /// Cycles spent in the current mode
    pub(crate) mode_cycles: u32,
    /// Window rows drawn so far this frame
    pub(crate) window_line: u8,
    /// LCDC bit 7 as seen on the previous step
    pub(crate) lcd_on: bool,

    /// Frame being drawn, row-major 160x144
    pub(crate) frame_buffer: Box<[Color]>,
    /// Last frame that reached VBlank
    completed: Box<[Color]>,
    /// Background/window colour indices of the line being drawn
    pub(crate) line_indices: [u8; SCREEN_WIDTH],
    frame_ready: bool,
    frames: u64,
}

impl Default for Ppu {
    fn default() -> Self {
        Self {
            mode: PpuMode::HBlank,
            mode_cycles: 0,
            window_line: 0,
            lcd_on: false,
            frame_buffer: vec![Color::WHITE; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice(),
            completed: vec![Color::WHITE; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice(),
            line_indices: [0; SCREEN_WIDTH],
            frame_ready: false,
            frames: 0,
        }
    }
}

impl Ppu {
    #[instrument(level = "debug")]
    pub fn new() -> Self {
        debug!("Initializing PPU");
        Self::default()
    }

    pub const fn mode(&self) -> PpuMode {
        self.mode
    }

    pub const fn mode_cycles(&self) -> u32 {
        self.mode_cycles
    }

    pub const fn lcd_enabled(&self) -> bool {
        self.lcd_on
    }

    /// Last completed frame (rows top to bottom). Stays untouched while the
    /// next frame is drawn.
    pub fn frame(&self) -> &[Color] {
        &self.completed
    }

    /// Number of frames completed since power-on
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// True once per completed frame; clears the flag
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// Advance the state machine by `cycles` T-cycles
    pub fn step(&mut self, bus: &mut dyn MemoryBus, cycles: u32) {
        let lcdc = LcdControl::from_bits_truncate(bus.read_byte(LCDC_ADDR));
        if !lcdc.contains(LcdControl::LCD_ENABLE) {
            if self.lcd_on {
                self.switch_off(bus);
            }
            return;
        }
        if !self.lcd_on {
            self.switch_on(bus);
        }
        // LYC may have been rewritten since the last step
        self.compare_lyc(bus);

        self.mode_cycles += cycles;
        while self.mode_cycles >= self.mode.duration() {
            self.mode_cycles -= self.mode.duration();
            self.advance_mode(bus);
        }
    }

    fn advance_mode(&mut self, bus: &mut dyn MemoryBus) {
        match self.mode {
            PpuMode::OamSearch => {
                self.render_scanline(bus);
                self.enter_mode(bus, PpuMode::PixelTransfer);
            }
            PpuMode::PixelTransfer => self.enter_mode(bus, PpuMode::HBlank),
            PpuMode::HBlank => {
                if self.next_line(bus) == VBLANK_LINE {
                    self.enter_mode(bus, PpuMode::VBlank);
                    bus.request_interrupt(InterruptFlag::VBlank);
                    // every visible line is redrawn before the next VBlank
                    std::mem::swap(&mut self.frame_buffer, &mut self.completed);
                    self.frame_ready = true;
                    self.frames += 1;
                    trace!(frame = self.frames, "VBlank");
                } else {
                    self.enter_mode(bus, PpuMode::OamSearch);
                }
            }
            PpuMode::VBlank => {
                if self.next_line(bus) == 0 {
                    self.window_line = 0;
                    self.enter_mode(bus, PpuMode::OamSearch);
                }
            }
        }
    }

    /// LY + 1, wrapping after line 153. Returns the new LY.
    fn next_line(&mut self, bus: &mut dyn MemoryBus) -> u8 {
        let ly = (bus.read_byte(LY_ADDR) + 1) % LINES_PER_FRAME;
        bus.poke(LY_ADDR, ly);
        self.compare_lyc(bus);
        ly
    }

    /// Update the coincidence bit, raising STAT when it goes from clear to set
    /// with the LYC interrupt enabled
    fn compare_lyc(&self, bus: &mut dyn MemoryBus) {
        let mut stat = LcdStatus::from_bits_truncate(bus.read_byte(STAT_ADDR));
        let equal = bus.read_byte(LY_ADDR) == bus.read_byte(LYC_ADDR);
        let rising = equal && !stat.contains(LcdStatus::LYC_EQUAL_LY);
        stat.set(LcdStatus::LYC_EQUAL_LY, equal);
        bus.poke(STAT_ADDR, stat.bits());
        if rising && stat.contains(LcdStatus::LYC_INTERRUPT) {
            bus.request_interrupt(InterruptFlag::LcdStat);
        }
    }

    fn enter_mode(&mut self, bus: &mut dyn MemoryBus, mode: PpuMode) {
        self.mode = mode;
        let mut stat = LcdStatus::from_bits_truncate(bus.read_byte(STAT_ADDR));
        stat.remove(LcdStatus::MODE_FLAG_MASK);
        stat |= LcdStatus::from_bits_truncate(mode as u8);
        bus.poke(STAT_ADDR, stat.bits());
        if mode.stat_interrupt().is_some_and(|enable| stat.contains(enable)) {
            bus.request_interrupt(InterruptFlag::LcdStat);
        }
    }

    fn switch_on(&mut self, bus: &mut dyn MemoryBus) {
        debug!("LCD on");
        self.lcd_on = true;
        self.mode_cycles = 0;
        self.window_line = 0;
        bus.poke(LY_ADDR, 0);
        let stat = bus.read_byte(STAT_ADDR) & !LcdStatus::LYC_EQUAL_LY.bits();
        bus.poke(STAT_ADDR, stat);
        self.compare_lyc(bus);
        self.enter_mode(bus, PpuMode::OamSearch);
    }

    fn switch_off(&mut self, bus: &mut dyn MemoryBus) {
        debug!("LCD off");
        self.lcd_on = false;
        self.mode = PpuMode::HBlank;
        self.mode_cycles = 0;
        self.window_line = 0;
        bus.poke(LY_ADDR, 0);
        let stat = bus.read_byte(STAT_ADDR) & !LcdStatus::MODE_FLAG_MASK.bits();
        bus.poke(STAT_ADDR, stat);
    }
}
