//! Jumps, calls, returns and restarts.
//!
//! Each handler returns whether the branch was taken so the caller can add
//! the taken cost.

use super::helpers::{pop_word, push_word};
use super::types::JumpCondition;
use crate::bus::MemoryBus;
use crate::cpu::CPU;

impl CPU {
    /// JP cc,a16. The address is consumed whether or not the jump is taken.
    pub(super) fn jump_absolute(&mut self, cond: JumpCondition, bus: &dyn MemoryBus) -> bool {
        let target = self.regs.read_next_word(bus);
        let taken = cond.holds(self.regs.f);
        if taken {
            self.regs.pc = target;
        }
        taken
    }

    /// JR cc,e8. The displacement is relative to the byte after it.
    pub(super) fn jump_relative(&mut self, cond: JumpCondition, bus: &dyn MemoryBus) -> bool {
        let offset = self.regs.read_next_byte(bus) as i8;
        let taken = cond.holds(self.regs.f);
        if taken {
            self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
        }
        taken
    }

    pub(super) fn call(&mut self, cond: JumpCondition, bus: &mut dyn MemoryBus) -> bool {
        let target = self.regs.read_next_word(bus);
        let taken = cond.holds(self.regs.f);
        if taken {
            let return_addr = self.regs.pc;
            push_word(&mut self.regs, bus, return_addr);
            self.regs.pc = target;
        }
        taken
    }

    pub(super) fn ret(&mut self, cond: JumpCondition, bus: &dyn MemoryBus) -> bool {
        let taken = cond.holds(self.regs.f);
        if taken {
            self.regs.pc = pop_word(&mut self.regs, bus);
        }
        taken
    }

    /// RETI returns and re-enables interrupts without the EI delay
    pub(super) fn reti(&mut self, bus: &dyn MemoryBus) {
        self.regs.pc = pop_word(&mut self.regs, bus);
        self.regs.ime = true;
        self.ime_delay = 0;
    }

    /// RST: push the address of the next instruction, jump to a fixed vector
    pub(super) fn restart(&mut self, vector: u8, bus: &mut dyn MemoryBus) {
        let return_addr = self.regs.pc;
        push_word(&mut self.regs, bus, return_addr);
        self.regs.pc = u16::from(vector);
    }
}
