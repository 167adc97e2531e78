//! Load and store instructions.

use super::alu;
use super::helpers::{pop_word, push_word};
use super::types::{Indirect, RegisterPair, Target};
use crate::bus::MemoryBus;
use crate::cpu::{CpuError, CPU};

impl CPU {
    /// LD dst,src over 8-bit operands. An immediate cannot be a destination.
    pub(super) fn load(
        &mut self,
        dst: Target,
        src: Target,
        pc: u16,
        bus: &mut dyn MemoryBus,
    ) -> Result<(), CpuError> {
        if dst == Target::N8 {
            return Err(CpuError::InvalidLoad { target: dst, pc });
        }
        let value = self.regs.get_register(src, bus);
        self.regs.set_register(dst, value, bus)
    }

    /// Resolve an indirect operand to its address, applying HL+/HL- and
    /// consuming immediates.
    fn indirect_address(&mut self, operand: Indirect, bus: &dyn MemoryBus) -> u16 {
        match operand {
            Indirect::BC => self.regs.bc(),
            Indirect::DE => self.regs.de(),
            Indirect::HLInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Indirect::HLDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
            Indirect::A16 => self.regs.read_next_word(bus),
            Indirect::HighN8 => 0xFF00 | u16::from(self.regs.read_next_byte(bus)),
            Indirect::HighC => 0xFF00 | u16::from(self.regs.c),
        }
    }

    pub(super) fn load_from_indirect(&mut self, src: Indirect, bus: &dyn MemoryBus) {
        let addr = self.indirect_address(src, bus);
        self.regs.a = bus.read_byte(addr);
    }

    pub(super) fn load_to_indirect(&mut self, dst: Indirect, bus: &mut dyn MemoryBus) {
        let addr = self.indirect_address(dst, bus);
        bus.write_byte(addr, self.regs.a);
    }

    /// LD rr,n16. AF has no immediate form.
    pub(super) fn load16(
        &mut self,
        pair: RegisterPair,
        pc: u16,
        bus: &dyn MemoryBus,
    ) -> Result<(), CpuError> {
        if pair == RegisterPair::AF {
            return Err(CpuError::InvalidOperand {
                operand: pair.to_string(),
                pc,
            });
        }
        let value = self.regs.read_next_word(bus);
        self.regs.set_pair(pair, value);
        Ok(())
    }

    /// LD (a16),SP
    pub(super) fn store_sp(&mut self, bus: &mut dyn MemoryBus) {
        let addr = self.regs.read_next_word(bus);
        bus.write_word(addr, self.regs.sp);
    }

    /// LD HL,SP+e8
    pub(super) fn load_hl_sp_offset(&mut self, bus: &dyn MemoryBus) {
        let offset = self.regs.read_next_byte(bus) as i8;
        let (value, flags) = alu::add_sp(self.regs.sp, offset);
        self.regs.set_hl(value);
        self.regs.f = flags;
    }

    /// PUSH rr. SP itself is not pushable.
    pub(super) fn push(
        &mut self,
        pair: RegisterPair,
        pc: u16,
        bus: &mut dyn MemoryBus,
    ) -> Result<(), CpuError> {
        if pair == RegisterPair::SP {
            return Err(CpuError::InvalidOperand {
                operand: pair.to_string(),
                pc,
            });
        }
        let value = self.regs.pair(pair);
        push_word(&mut self.regs, bus, value);
        Ok(())
    }

    /// POP rr. Popping AF drops the low nibble of F.
    pub(super) fn pop(
        &mut self,
        pair: RegisterPair,
        pc: u16,
        bus: &dyn MemoryBus,
    ) -> Result<(), CpuError> {
        if pair == RegisterPair::SP {
            return Err(CpuError::InvalidOperand {
                operand: pair.to_string(),
                pc,
            });
        }
        let value = pop_word(&mut self.regs, bus);
        self.regs.set_pair(pair, value);
        Ok(())
    }
}
