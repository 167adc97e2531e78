/// core-lib/src/cpu/mod.rs
use crate::bus::MemoryBus;
use crate::interrupts::Interrupts;
use crate::ppu::Ppu;
use crate::timer::Timer;
use thiserror::Error;
use tracing::{debug, error, trace};

pub mod disasm;
pub mod opcodes;
pub mod registers;

pub use disasm::{disassemble, DisassembledLine};
pub use opcodes::{decode, Instruction, InstructionKind, Target, CB_OPCODES, OPCODES};
pub use registers::{Flags, Registers};

use opcodes::helpers::push_word;
use opcodes::CB_PREFIX;

/// Cycles spent dispatching an interrupt (two wait states, two pushes, jump)
pub const INTERRUPT_DISPATCH_CYCLES: u32 = 20;
/// Cycles a halted CPU burns per step
pub const HALT_CYCLES: u32 = 4;

/// Fatal execution faults. After one is raised the CPU stays locked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("illegal opcode {opcode:#04X} at {pc:#06X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
    #[error("operand {operand} is not valid here (at {pc:#06X})")]
    InvalidOperand { operand: String, pc: u16 },
    #[error("cannot load into {target} (at {pc:#06X})")]
    InvalidLoad { target: Target, pc: u16 },
    #[error("CB prefix dispatched as an instruction at {pc:#06X}")]
    UnexpectedPrefix { pc: u16 },
}

/// The SM83 core. Owns the timer and PPU it drives each step.
pub struct CPU {
    pub regs: Registers,
    pub timer: Timer,
    pub ppu: Ppu,
    /// STOP was executed (not modelled beyond the flag)
    pub stopped: bool,
    /// Steps left until a pending EI takes effect
    ime_delay: u8,
    /// Set once a fatal fault has been raised
    fault: Option<CpuError>,
    cycles: u64,
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}

impl CPU {
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            timer: Timer::new(),
            ppu: Ppu::new(),
            stopped: false,
            ime_delay: 0,
            fault: None,
            cycles: 0,
        }
    }

    /// Register state the boot firmware leaves behind at 0x0100
    pub fn post_boot(&mut self) {
        self.regs.set_af(0x01B0);
        self.regs.set_bc(0x0013);
        self.regs.set_de(0x00D8);
        self.regs.set_hl(0x014D);
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
    }

    /// Run one instruction (or one halted tick), advance timer and PPU by the
    /// elapsed cycles, then service at most one interrupt.
    ///
    /// Returns the T-cycles consumed, interrupt dispatch included.
    pub fn step(&mut self, bus: &mut dyn MemoryBus) -> Result<u32, CpuError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        let mut cycles = if self.regs.halted {
            HALT_CYCLES
        } else {
            match self.fetch_and_execute(bus) {
                Ok(cycles) => cycles,
                Err(fault) => {
                    error!(%fault, "CPU locked up");
                    self.fault = Some(fault.clone());
                    return Err(fault);
                }
            }
        };

        if self.ime_delay > 0 {
            self.ime_delay -= 1;
            if self.ime_delay == 0 {
                self.regs.ime = true;
            }
        }

        self.tick(bus, cycles);

        if self.regs.halted && bus.pending_interrupts() != 0 {
            debug!(pc = format_args!("{:#06X}", self.regs.pc), "HALT wake-up");
            self.regs.halted = false;
        }
        if self.service_interrupt(bus) {
            self.tick(bus, INTERRUPT_DISPATCH_CYCLES);
            cycles += INTERRUPT_DISPATCH_CYCLES;
        }

        self.cycles += u64::from(cycles);
        Ok(cycles)
    }

    fn fetch_and_execute(&mut self, bus: &mut dyn MemoryBus) -> Result<u32, CpuError> {
        let pc = self.regs.pc;
        let opcode = self.regs.read_next_byte(bus);
        let instruction = if opcode == CB_PREFIX {
            let cb_opcode = self.regs.read_next_byte(bus);
            decode(cb_opcode, true)
        } else {
            decode(opcode, false)
        };

        trace!(
            pc = format_args!("{pc:#06X}"),
            opcode = format_args!("{opcode:#04X}"),
            %instruction,
            a = self.regs.a,
            f = self.regs.f.bits(),
            sp = self.regs.sp,
            "exec"
        );

        let taken = self.execute(instruction, opcode, pc, bus)?;
        Ok(instruction.cycles + if taken { instruction.taken_cycles } else { 0 })
    }

    fn tick(&mut self, bus: &mut dyn MemoryBus, cycles: u32) {
        self.timer.step(bus, cycles);
        self.ppu.step(bus, cycles);
    }

    /// Dispatch the highest priority pending interrupt if IME allows it
    fn service_interrupt(&mut self, bus: &mut dyn MemoryBus) -> bool {
        if !self.regs.ime {
            return false;
        }
        let Some(interrupt) = bus.next_interrupt() else {
            return false;
        };
        debug!(
            ?interrupt,
            from = format_args!("{:#06X}", self.regs.pc),
            "Servicing interrupt"
        );
        self.regs.ime = false;
        self.ime_delay = 0;
        self.regs.halted = false;
        bus.clear_interrupt(interrupt);
        let return_addr = self.regs.pc;
        push_word(&mut self.regs, bus, return_addr);
        self.regs.pc = interrupt.vector();
        true
    }

    /// Total T-cycles since power-on
    pub const fn get_cycles(&self) -> u64 {
        self.cycles
    }

    pub const fn fault(&self) -> Option<&CpuError> {
        self.fault.as_ref()
    }

    /// True while an EI has been executed but IME is not yet set
    pub const fn ime_pending(&self) -> bool {
        self.ime_delay > 0
    }
}
