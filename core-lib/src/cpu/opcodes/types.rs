//! Instruction descriptors produced by the decoder.
//!
//! A descriptor is plain `Copy` data: what to do, which operands, and what it
//! costs. Execution lives in the sibling modules.

use super::super::registers::Flags;
use std::fmt;

/// 8-bit operand selector. `HLI` is the byte at (HL), `N8` an immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    HLI,
    N8,
}

impl Target {
    /// Operand order used by the opcode encoding (bits 0-2 / 3-5)
    pub const ENCODED: [Self; 8] = [
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::H,
        Self::L,
        Self::HLI,
        Self::A,
    ];

    pub const fn is_memory(self) -> bool {
        matches!(self, Self::HLI)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterPair {
    AF,
    BC,
    DE,
    HL,
    SP,
}

/// Memory operand of the accumulator loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indirect {
    BC,
    DE,
    /// (HL), then HL += 1
    HLInc,
    /// (HL), then HL -= 1
    HLDec,
    /// Absolute 16-bit address
    A16,
    /// 0xFF00 + immediate byte
    HighN8,
    /// 0xFF00 + C
    HighC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpCondition {
    Always,
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

impl JumpCondition {
    /// Conditional encodings in opcode order (NZ, Z, NC, C)
    pub const ENCODED: [Self; 4] = [Self::NotZero, Self::Zero, Self::NotCarry, Self::Carry];

    pub const fn holds(self, flags: Flags) -> bool {
        match self {
            Self::Always => true,
            Self::NotZero => !flags.contains(Flags::ZERO),
            Self::Zero => flags.contains(Flags::ZERO),
            Self::NotCarry => !flags.contains(Flags::CARRY),
            Self::Carry => flags.contains(Flags::CARRY),
        }
    }
}

/// Operation category of a decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// Undefined opcode; executing it locks the CPU
    Illegal,
    /// The 0xCB prefix byte itself
    Prefix,
    Nop,
    Stop,
    Halt,
    Di,
    Ei,

    Add(Target),
    Adc(Target),
    Sub(Target),
    Sbc(Target),
    And(Target),
    Xor(Target),
    Or(Target),
    Cp(Target),
    Inc(Target),
    Dec(Target),
    Inc16(RegisterPair),
    Dec16(RegisterPair),
    AddHl(RegisterPair),
    AddSp,
    Daa,
    Cpl,
    Scf,
    Ccf,

    Rlca,
    Rrca,
    Rla,
    Rra,
    Rlc(Target),
    Rrc(Target),
    Rl(Target),
    Rr(Target),
    Sla(Target),
    Sra(Target),
    Swap(Target),
    Srl(Target),
    Bit(u8, Target),
    Res(u8, Target),
    Set(u8, Target),

    /// LD dst, src over 8-bit operands
    Load(Target, Target),
    /// LD A, (indirect)
    LoadFromIndirect(Indirect),
    /// LD (indirect), A
    LoadToIndirect(Indirect),
    /// LD rr, n16
    Load16(RegisterPair),
    /// LD (a16), SP
    StoreSp,
    /// LD SP, HL
    LoadSpHl,
    /// LD HL, SP+e8
    LoadHlSp,

    Jp(JumpCondition),
    JpHl,
    Jr(JumpCondition),
    Call(JumpCondition),
    Ret(JumpCondition),
    Reti,
    Rst(u8),
    Push(RegisterPair),
    Pop(RegisterPair),
}

/// Immutable decoded instruction with its T-cycle cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub kind: InstructionKind,
    /// Cost when no branch is taken
    pub cycles: u32,
    /// Added on top of `cycles` when a branch is taken
    pub taken_cycles: u32,
}

impl Instruction {
    pub const ILLEGAL: Self = Self::new(InstructionKind::Illegal, 4);

    pub const fn new(kind: InstructionKind, cycles: u32) -> Self {
        Self {
            kind,
            cycles,
            taken_cycles: 0,
        }
    }

    pub const fn branch(kind: InstructionKind, cycles: u32, taken_cycles: u32) -> Self {
        Self {
            kind,
            cycles,
            taken_cycles,
        }
    }

    pub const fn is_illegal(&self) -> bool {
        matches!(self.kind, InstructionKind::Illegal)
    }

    /// Number of immediate bytes following the opcode byte(s)
    pub const fn immediate_len(&self) -> u16 {
        use InstructionKind as K;
        match self.kind {
            K::Load16(_) | K::StoreSp | K::Jp(_) | K::Call(_) => 2,
            K::LoadFromIndirect(Indirect::A16) | K::LoadToIndirect(Indirect::A16) => 2,
            K::LoadFromIndirect(Indirect::HighN8) | K::LoadToIndirect(Indirect::HighN8) => 1,
            K::Jr(_) | K::AddSp | K::LoadHlSp | K::Stop => 1,
            K::Add(t) | K::Adc(t) | K::Sub(t) | K::Sbc(t) => (matches!(t, Target::N8)) as u16,
            K::And(t) | K::Xor(t) | K::Or(t) | K::Cp(t) => (matches!(t, Target::N8)) as u16,
            K::Load(_, Target::N8) => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::H => "H",
            Self::L => "L",
            Self::HLI => "(HL)",
            Self::N8 => "n8",
        };
        f.write_str(name)
    }
}

impl fmt::Display for RegisterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AF => "AF",
            Self::BC => "BC",
            Self::DE => "DE",
            Self::HL => "HL",
            Self::SP => "SP",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Indirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BC => "(BC)",
            Self::DE => "(DE)",
            Self::HLInc => "(HL+)",
            Self::HLDec => "(HL-)",
            Self::A16 => "(a16)",
            Self::HighN8 => "(a8)",
            Self::HighC => "(C)",
        };
        f.write_str(name)
    }
}

impl fmt::Display for JumpCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Always => "",
            Self::NotZero => "NZ",
            Self::Zero => "Z",
            Self::NotCarry => "NC",
            Self::Carry => "C",
        };
        f.write_str(name)
    }
}

/// "JP a16" / "JP NZ,a16"
fn with_condition(
    f: &mut fmt::Formatter<'_>,
    mnemonic: &str,
    cond: JumpCondition,
    operand: &str,
) -> fmt::Result {
    match (cond, operand.is_empty()) {
        (JumpCondition::Always, true) => f.write_str(mnemonic),
        (JumpCondition::Always, false) => write!(f, "{mnemonic} {operand}"),
        (_, true) => write!(f, "{mnemonic} {cond}"),
        (_, false) => write!(f, "{mnemonic} {cond},{operand}"),
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Illegal => f.write_str("ILLEGAL"),
            Self::Prefix => f.write_str("PREFIX CB"),
            Self::Nop => f.write_str("NOP"),
            Self::Stop => f.write_str("STOP n8"),
            Self::Halt => f.write_str("HALT"),
            Self::Di => f.write_str("DI"),
            Self::Ei => f.write_str("EI"),
            Self::Add(t) => write!(f, "ADD A,{t}"),
            Self::Adc(t) => write!(f, "ADC A,{t}"),
            Self::Sub(t) => write!(f, "SUB {t}"),
            Self::Sbc(t) => write!(f, "SBC A,{t}"),
            Self::And(t) => write!(f, "AND {t}"),
            Self::Xor(t) => write!(f, "XOR {t}"),
            Self::Or(t) => write!(f, "OR {t}"),
            Self::Cp(t) => write!(f, "CP {t}"),
            Self::Inc(t) => write!(f, "INC {t}"),
            Self::Dec(t) => write!(f, "DEC {t}"),
            Self::Inc16(p) => write!(f, "INC {p}"),
            Self::Dec16(p) => write!(f, "DEC {p}"),
            Self::AddHl(p) => write!(f, "ADD HL,{p}"),
            Self::AddSp => f.write_str("ADD SP,e8"),
            Self::Daa => f.write_str("DAA"),
            Self::Cpl => f.write_str("CPL"),
            Self::Scf => f.write_str("SCF"),
            Self::Ccf => f.write_str("CCF"),
            Self::Rlca => f.write_str("RLCA"),
            Self::Rrca => f.write_str("RRCA"),
            Self::Rla => f.write_str("RLA"),
            Self::Rra => f.write_str("RRA"),
            Self::Rlc(t) => write!(f, "RLC {t}"),
            Self::Rrc(t) => write!(f, "RRC {t}"),
            Self::Rl(t) => write!(f, "RL {t}"),
            Self::Rr(t) => write!(f, "RR {t}"),
            Self::Sla(t) => write!(f, "SLA {t}"),
            Self::Sra(t) => write!(f, "SRA {t}"),
            Self::Swap(t) => write!(f, "SWAP {t}"),
            Self::Srl(t) => write!(f, "SRL {t}"),
            Self::Bit(b, t) => write!(f, "BIT {b},{t}"),
            Self::Res(b, t) => write!(f, "RES {b},{t}"),
            Self::Set(b, t) => write!(f, "SET {b},{t}"),
            Self::Load(dst, src) => write!(f, "LD {dst},{src}"),
            Self::LoadFromIndirect(Indirect::HighN8) => f.write_str("LDH A,(a8)"),
            Self::LoadToIndirect(Indirect::HighN8) => f.write_str("LDH (a8),A"),
            Self::LoadFromIndirect(src) => write!(f, "LD A,{src}"),
            Self::LoadToIndirect(dst) => write!(f, "LD {dst},A"),
            Self::Load16(p) => write!(f, "LD {p},n16"),
            Self::StoreSp => f.write_str("LD (a16),SP"),
            Self::LoadSpHl => f.write_str("LD SP,HL"),
            Self::LoadHlSp => f.write_str("LD HL,SP+e8"),
            Self::Jp(cond) => with_condition(f, "JP", cond, "a16"),
            Self::JpHl => f.write_str("JP HL"),
            Self::Jr(cond) => with_condition(f, "JR", cond, "e8"),
            Self::Call(cond) => with_condition(f, "CALL", cond, "a16"),
            Self::Ret(cond) => with_condition(f, "RET", cond, ""),
            Self::Reti => f.write_str("RETI"),
            Self::Rst(vector) => write!(f, "RST ${vector:02X}"),
            Self::Push(p) => write!(f, "PUSH {p}"),
            Self::Pop(p) => write!(f, "POP {p}"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}
