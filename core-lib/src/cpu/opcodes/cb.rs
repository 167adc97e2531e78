//! CB-prefixed instructions: rotates, shifts, SWAP, BIT, RES and SET.

use super::alu;
use super::types::{Instruction, InstructionKind, Target};
use crate::bus::MemoryBus;
use crate::cpu::registers::Flags;
use crate::cpu::{CpuError, CPU};
use once_cell::sync::Lazy;

/// The CB-prefixed table (0x00..=0xFF), costs include the prefix fetch.
pub static CB_OPCODES: Lazy<[Instruction; 256]> = Lazy::new(|| {
    let mut table = [Instruction::ILLEGAL; 256];

    let shifts: [fn(Target) -> InstructionKind; 8] = [
        InstructionKind::Rlc,
        InstructionKind::Rrc,
        InstructionKind::Rl,
        InstructionKind::Rr,
        InstructionKind::Sla,
        InstructionKind::Sra,
        InstructionKind::Swap,
        InstructionKind::Srl,
    ];

    for (row, make) in shifts.iter().enumerate() {
        for (col, &target) in Target::ENCODED.iter().enumerate() {
            let cycles = if target.is_memory() { 16 } else { 8 };
            table[(row << 3) | col] = Instruction::new(make(target), cycles);
        }
    }

    for bit in 0..8u8 {
        for (col, &target) in Target::ENCODED.iter().enumerate() {
            let code = (usize::from(bit) << 3) | col;
            let (read_only, read_write) = if target.is_memory() { (12, 16) } else { (8, 8) };
            table[0x40 | code] = Instruction::new(InstructionKind::Bit(bit, target), read_only);
            table[0x80 | code] = Instruction::new(InstructionKind::Res(bit, target), read_write);
            table[0xC0 | code] = Instruction::new(InstructionKind::Set(bit, target), read_write);
        }
    }

    table
});

impl CPU {
    /// Read-modify-write through `target` using a shift/rotate function
    pub(super) fn shift_op(
        &mut self,
        target: Target,
        bus: &mut dyn MemoryBus,
        op: impl FnOnce(u8, bool) -> (u8, Flags),
    ) -> Result<(), CpuError> {
        let value = self.regs.get_register(target, bus);
        let (result, flags) = op(value, self.regs.f.contains(Flags::CARRY));
        self.regs.set_register(target, result, bus)?;
        self.regs.f = flags;
        Ok(())
    }

    pub(super) fn test_bit(&mut self, bit: u8, target: Target, bus: &dyn MemoryBus) {
        let value = self.regs.get_register(target, bus);
        self.regs.f = alu::bit(bit, value, self.regs.f);
    }

    /// RES/SET leave the flags alone
    pub(super) fn write_bit(
        &mut self,
        bit: u8,
        target: Target,
        set: bool,
        bus: &mut dyn MemoryBus,
    ) -> Result<(), CpuError> {
        let value = self.regs.get_register(target, bus);
        let mask = 1 << (bit & 7);
        let result = if set { value | mask } else { value & !mask };
        self.regs.set_register(target, result, bus)
    }
}
