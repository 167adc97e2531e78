//! Opcode tables, decoding and instruction dispatch.
//!
//! The two 256-entry tables are built once on first use and never change.
//! Decoding is a plain index into one of them.
use once_cell::sync::Lazy;

pub mod alu;
pub mod cb;
pub(crate) mod helpers;
pub mod jump;
pub mod load_store;
pub mod types;

pub use cb::CB_OPCODES;
pub use types::{Indirect, Instruction, InstructionKind, JumpCondition, RegisterPair, Target};

use crate::bus::MemoryBus;
use crate::cpu::registers::Flags;
use crate::cpu::{CpuError, CPU};

/// The byte that selects the CB table for the following opcode
pub const CB_PREFIX: u8 = 0xCB;

/// Undefined opcodes of the unprefixed table
pub const ILLEGAL_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

/// The main opcode table for the CPU (0x00..=0xFF). Costs are T-cycles.
pub static OPCODES: Lazy<[Instruction; 256]> = Lazy::new(|| {
    use InstructionKind as K;

    let mut table = [Instruction::ILLEGAL; 256];
    let cost = |target: Target, register: u32, memory: u32| {
        if target.is_memory() {
            memory
        } else {
            register
        }
    };

    // --- 8-bit loads, INC/DEC r, LD r,n8 ---
    for (row, &dst) in Target::ENCODED.iter().enumerate() {
        for (col, &src) in Target::ENCODED.iter().enumerate() {
            let cycles = if dst.is_memory() || src.is_memory() { 8 } else { 4 };
            table[0x40 | (row << 3) | col] = Instruction::new(K::Load(dst, src), cycles);
        }
        table[0x04 | (row << 3)] = Instruction::new(K::Inc(dst), cost(dst, 4, 12));
        table[0x05 | (row << 3)] = Instruction::new(K::Dec(dst), cost(dst, 4, 12));
        table[0x06 | (row << 3)] = Instruction::new(K::Load(dst, Target::N8), cost(dst, 8, 12));
    }
    // LD (HL),(HL) slot
    table[0x76] = Instruction::new(K::Halt, 4);

    // --- ALU A,r and A,n8 ---
    let alu: [fn(Target) -> InstructionKind; 8] = [
        K::Add,
        K::Adc,
        K::Sub,
        K::Sbc,
        K::And,
        K::Xor,
        K::Or,
        K::Cp,
    ];
    for (row, make) in alu.iter().enumerate() {
        for (col, &src) in Target::ENCODED.iter().enumerate() {
            table[0x80 | (row << 3) | col] = Instruction::new(make(src), cost(src, 4, 8));
        }
        table[0xC6 | (row << 3)] = Instruction::new(make(Target::N8), 8);
    }

    // --- 16-bit arithmetic and loads ---
    let pairs = [
        RegisterPair::BC,
        RegisterPair::DE,
        RegisterPair::HL,
        RegisterPair::SP,
    ];
    for (row, &pair) in pairs.iter().enumerate() {
        table[0x01 | (row << 4)] = Instruction::new(K::Load16(pair), 12);
        table[0x03 | (row << 4)] = Instruction::new(K::Inc16(pair), 8);
        table[0x09 | (row << 4)] = Instruction::new(K::AddHl(pair), 8);
        table[0x0B | (row << 4)] = Instruction::new(K::Dec16(pair), 8);
    }
    let stack_pairs = [
        RegisterPair::BC,
        RegisterPair::DE,
        RegisterPair::HL,
        RegisterPair::AF,
    ];
    for (row, &pair) in stack_pairs.iter().enumerate() {
        table[0xC1 | (row << 4)] = Instruction::new(K::Pop(pair), 12);
        table[0xC5 | (row << 4)] = Instruction::new(K::Push(pair), 16);
    }

    // --- Accumulator loads through memory ---
    let indirect = [Indirect::BC, Indirect::DE, Indirect::HLInc, Indirect::HLDec];
    for (row, &operand) in indirect.iter().enumerate() {
        table[0x02 | (row << 4)] = Instruction::new(K::LoadToIndirect(operand), 8);
        table[0x0A | (row << 4)] = Instruction::new(K::LoadFromIndirect(operand), 8);
    }
    table[0xE0] = Instruction::new(K::LoadToIndirect(Indirect::HighN8), 12);
    table[0xF0] = Instruction::new(K::LoadFromIndirect(Indirect::HighN8), 12);
    table[0xE2] = Instruction::new(K::LoadToIndirect(Indirect::HighC), 8);
    table[0xF2] = Instruction::new(K::LoadFromIndirect(Indirect::HighC), 8);
    table[0xEA] = Instruction::new(K::LoadToIndirect(Indirect::A16), 16);
    table[0xFA] = Instruction::new(K::LoadFromIndirect(Indirect::A16), 16);
    table[0x08] = Instruction::new(K::StoreSp, 20);
    table[0xF8] = Instruction::new(K::LoadHlSp, 12);
    table[0xF9] = Instruction::new(K::LoadSpHl, 8);
    table[0xE8] = Instruction::new(K::AddSp, 16);

    // --- Jump/Call/Return ---
    for (row, &cond) in JumpCondition::ENCODED.iter().enumerate() {
        table[0x20 | (row << 3)] = Instruction::branch(K::Jr(cond), 8, 4);
        table[0xC0 | (row << 3)] = Instruction::branch(K::Ret(cond), 8, 12);
        table[0xC2 | (row << 3)] = Instruction::branch(K::Jp(cond), 12, 4);
        table[0xC4 | (row << 3)] = Instruction::branch(K::Call(cond), 12, 12);
    }
    // unconditional forms always take the branch
    table[0x18] = Instruction::branch(K::Jr(JumpCondition::Always), 8, 4);
    table[0xC3] = Instruction::branch(K::Jp(JumpCondition::Always), 12, 4);
    table[0xCD] = Instruction::branch(K::Call(JumpCondition::Always), 12, 12);
    table[0xC9] = Instruction::branch(K::Ret(JumpCondition::Always), 4, 12);
    table[0xD9] = Instruction::new(K::Reti, 16);
    table[0xE9] = Instruction::new(K::JpHl, 4);
    for vector in (0x00..=0x38u8).step_by(8) {
        table[0xC7 | usize::from(vector)] = Instruction::new(K::Rst(vector), 16);
    }

    // --- Misc ---
    table[0x00] = Instruction::new(K::Nop, 4);
    table[0x10] = Instruction::new(K::Stop, 4);
    table[0x07] = Instruction::new(K::Rlca, 4);
    table[0x0F] = Instruction::new(K::Rrca, 4);
    table[0x17] = Instruction::new(K::Rla, 4);
    table[0x1F] = Instruction::new(K::Rra, 4);
    table[0x27] = Instruction::new(K::Daa, 4);
    table[0x2F] = Instruction::new(K::Cpl, 4);
    table[0x37] = Instruction::new(K::Scf, 4);
    table[0x3F] = Instruction::new(K::Ccf, 4);
    table[0xF3] = Instruction::new(K::Di, 4);
    table[0xFB] = Instruction::new(K::Ei, 4);
    table[usize::from(CB_PREFIX)] = Instruction::new(K::Prefix, 4);

    table
});

/// Look up the descriptor for `opcode` in the prefixed or unprefixed table
pub fn decode(opcode: u8, prefixed: bool) -> Instruction {
    if prefixed {
        CB_OPCODES[usize::from(opcode)]
    } else {
        OPCODES[usize::from(opcode)]
    }
}

impl CPU {
    /// Apply a decoded instruction. `opcode` and `pc` identify the fetch for
    /// error reporting. Returns whether a conditional branch was taken.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn execute(
        &mut self,
        instruction: Instruction,
        opcode: u8,
        pc: u16,
        bus: &mut dyn MemoryBus,
    ) -> Result<bool, CpuError> {
        use InstructionKind as K;

        match instruction.kind {
            K::Illegal => return Err(CpuError::IllegalOpcode { opcode, pc }),
            K::Prefix => return Err(CpuError::UnexpectedPrefix { pc }),
            K::Nop => {}
            K::Stop => {
                // second byte of STOP is padding
                self.regs.read_next_byte(bus);
                self.stopped = true;
            }
            K::Halt => self.regs.halted = true,
            K::Di => {
                self.regs.ime = false;
                self.ime_delay = 0;
            }
            K::Ei => self.ime_delay = 2,

            K::Add(src) => self.accumulate(src, bus, |a, v, _| alu::add(a, v, false)),
            K::Adc(src) => self.accumulate(src, bus, alu::add),
            K::Sub(src) => self.accumulate(src, bus, |a, v, _| alu::sub(a, v, false)),
            K::Sbc(src) => self.accumulate(src, bus, alu::sub),
            K::And(src) => self.accumulate(src, bus, |a, v, _| alu::and(a, v)),
            K::Xor(src) => self.accumulate(src, bus, |a, v, _| alu::xor(a, v)),
            K::Or(src) => self.accumulate(src, bus, |a, v, _| alu::or(a, v)),
            K::Cp(src) => {
                let value = self.regs.get_register(src, bus);
                self.regs.f = alu::sub(self.regs.a, value, false).1;
            }
            K::Inc(target) => {
                let value = self.regs.get_register(target, bus);
                let (result, flags) = alu::inc(value, self.regs.f);
                self.regs.set_register(target, result, bus)?;
                self.regs.f = flags;
            }
            K::Dec(target) => {
                let value = self.regs.get_register(target, bus);
                let (result, flags) = alu::dec(value, self.regs.f);
                self.regs.set_register(target, result, bus)?;
                self.regs.f = flags;
            }
            K::Inc16(pair) => {
                let value = self.word_operand(pair, pc)?;
                self.regs.set_pair(pair, value.wrapping_add(1));
            }
            K::Dec16(pair) => {
                let value = self.word_operand(pair, pc)?;
                self.regs.set_pair(pair, value.wrapping_sub(1));
            }
            K::AddHl(pair) => {
                let value = self.word_operand(pair, pc)?;
                let (result, flags) = alu::add16(self.regs.hl(), value, self.regs.f);
                self.regs.set_hl(result);
                self.regs.f = flags;
            }
            K::AddSp => {
                let offset = self.regs.read_next_byte(bus) as i8;
                let (result, flags) = alu::add_sp(self.regs.sp, offset);
                self.regs.sp = result;
                self.regs.f = flags;
            }
            K::Daa => {
                let (result, flags) = alu::daa(self.regs.a, self.regs.f);
                self.regs.a = result;
                self.regs.f = flags;
            }
            K::Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.f.insert(Flags::SUBTRACT | Flags::HALF_CARRY);
            }
            K::Scf => {
                self.regs.f.remove(Flags::SUBTRACT | Flags::HALF_CARRY);
                self.regs.f.insert(Flags::CARRY);
            }
            K::Ccf => {
                self.regs.f.remove(Flags::SUBTRACT | Flags::HALF_CARRY);
                self.regs.f.toggle(Flags::CARRY);
            }

            K::Rlca => self.rotate_accumulator(|v, _| alu::rlc(v)),
            K::Rrca => self.rotate_accumulator(|v, _| alu::rrc(v)),
            K::Rla => self.rotate_accumulator(alu::rl),
            K::Rra => self.rotate_accumulator(alu::rr),
            K::Rlc(target) => self.shift_op(target, bus, |v, _| alu::rlc(v))?,
            K::Rrc(target) => self.shift_op(target, bus, |v, _| alu::rrc(v))?,
            K::Rl(target) => self.shift_op(target, bus, alu::rl)?,
            K::Rr(target) => self.shift_op(target, bus, alu::rr)?,
            K::Sla(target) => self.shift_op(target, bus, |v, _| alu::sla(v))?,
            K::Sra(target) => self.shift_op(target, bus, |v, _| alu::sra(v))?,
            K::Swap(target) => self.shift_op(target, bus, |v, _| alu::swap(v))?,
            K::Srl(target) => self.shift_op(target, bus, |v, _| alu::srl(v))?,
            K::Bit(bit, target) => self.test_bit(bit, target, bus),
            K::Res(bit, target) => self.write_bit(bit, target, false, bus)?,
            K::Set(bit, target) => self.write_bit(bit, target, true, bus)?,

            K::Load(dst, src) => self.load(dst, src, pc, bus)?,
            K::LoadFromIndirect(src) => self.load_from_indirect(src, bus),
            K::LoadToIndirect(dst) => self.load_to_indirect(dst, bus),
            K::Load16(pair) => self.load16(pair, pc, bus)?,
            K::StoreSp => self.store_sp(bus),
            K::LoadSpHl => self.regs.sp = self.regs.hl(),
            K::LoadHlSp => self.load_hl_sp_offset(bus),

            K::Jp(cond) => return Ok(self.jump_absolute(cond, bus)),
            K::JpHl => self.regs.pc = self.regs.hl(),
            K::Jr(cond) => return Ok(self.jump_relative(cond, bus)),
            K::Call(cond) => return Ok(self.call(cond, bus)),
            K::Ret(cond) => return Ok(self.ret(cond, bus)),
            K::Reti => self.reti(bus),
            K::Rst(vector) => self.restart(vector, bus),
            K::Push(pair) => self.push(pair, pc, bus)?,
            K::Pop(pair) => self.pop(pair, pc, bus)?,
        }
        Ok(false)
    }

    /// A <- op(A, operand, carry)
    fn accumulate(
        &mut self,
        src: Target,
        bus: &dyn MemoryBus,
        op: impl FnOnce(u8, u8, bool) -> (u8, Flags),
    ) {
        let value = self.regs.get_register(src, bus);
        let (result, flags) = op(self.regs.a, value, self.regs.f.contains(Flags::CARRY));
        self.regs.a = result;
        self.regs.f = flags;
    }

    fn rotate_accumulator(&mut self, op: impl FnOnce(u8, bool) -> (u8, Flags)) {
        let (result, flags) = alu::accumulator(op(self.regs.a, self.regs.f.contains(Flags::CARRY)));
        self.regs.a = result;
        self.regs.f = flags;
    }

    /// 16-bit arithmetic operand; AF is never one
    fn word_operand(&self, pair: RegisterPair, pc: u16) -> Result<u16, CpuError> {
        if pair == RegisterPair::AF {
            return Err(CpuError::InvalidOperand {
                operand: pair.to_string(),
                pc,
            });
        }
        Ok(self.regs.pair(pair))
    }
}

#[cfg(test)]
mod tests;
