/// core-lib/src/cpu/registers.rs
use super::opcodes::types::{RegisterPair, Target};
use super::CpuError;
use crate::bus::MemoryBus;
use bitflags::bitflags;

bitflags! {
    /// Upper nibble of F. The lower nibble does not exist.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const ZERO       = 0b1000_0000;
        const SUBTRACT   = 0b0100_0000;
        const HALF_CARRY = 0b0010_0000;
        const CARRY      = 0b0001_0000;
    }
}

impl Flags {
    /// Build a flag set from the four individual bits
    pub fn from_bools(zero: bool, subtract: bool, half_carry: bool, carry: bool) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::ZERO, zero);
        flags.set(Self::SUBTRACT, subtract);
        flags.set(Self::HALF_CARRY, half_carry);
        flags.set(Self::CARRY, carry);
        flags
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub pc: u16,
    pub sp: u16,
    /// Interrupt master enable
    pub ime: bool,
    pub halted: bool,
}

impl Registers {
    pub const fn af(&self) -> u16 {
        ((self.a as u16) << 8) | (self.f.bits() as u16)
    }

    pub fn set_af(&mut self, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.a = hi;
        self.f = Flags::from_bits_truncate(lo);
    }

    pub const fn bc(&self) -> u16 {
        ((self.b as u16) << 8) | (self.c as u16)
    }

    pub fn set_bc(&mut self, val: u16) {
        [self.c, self.b] = val.to_le_bytes();
    }

    pub const fn de(&self) -> u16 {
        ((self.d as u16) << 8) | (self.e as u16)
    }

    pub fn set_de(&mut self, val: u16) {
        [self.e, self.d] = val.to_le_bytes();
    }

    pub const fn hl(&self) -> u16 {
        ((self.h as u16) << 8) | (self.l as u16)
    }

    pub fn set_hl(&mut self, val: u16) {
        [self.l, self.h] = val.to_le_bytes();
    }

    pub const fn pair(&self, pair: RegisterPair) -> u16 {
        match pair {
            RegisterPair::AF => self.af(),
            RegisterPair::BC => self.bc(),
            RegisterPair::DE => self.de(),
            RegisterPair::HL => self.hl(),
            RegisterPair::SP => self.sp,
        }
    }

    pub fn set_pair(&mut self, pair: RegisterPair, val: u16) {
        match pair {
            RegisterPair::AF => self.set_af(val),
            RegisterPair::BC => self.set_bc(val),
            RegisterPair::DE => self.set_de(val),
            RegisterPair::HL => self.set_hl(val),
            RegisterPair::SP => self.sp = val,
        }
    }

    /// Read the byte at PC, then advance PC past it
    pub fn read_next_byte(&mut self, bus: &dyn MemoryBus) -> u8 {
        let value = bus.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    /// Read the little-endian word at PC, then advance PC past it
    pub fn read_next_word(&mut self, bus: &dyn MemoryBus) -> u16 {
        let lo = self.read_next_byte(bus);
        let hi = self.read_next_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub fn update_flags(&mut self, zero: bool, subtract: bool, half_carry: bool, carry: bool) {
        self.f = Flags::from_bools(zero, subtract, half_carry, carry);
    }

    /// Value of an 8-bit operand. `(HL)` reads the bus, `n8` consumes an immediate.
    pub fn get_register(&mut self, target: Target, bus: &dyn MemoryBus) -> u8 {
        match target {
            Target::A => self.a,
            Target::B => self.b,
            Target::C => self.c,
            Target::D => self.d,
            Target::E => self.e,
            Target::H => self.h,
            Target::L => self.l,
            Target::HLI => bus.read_byte(self.hl()),
            Target::N8 => self.read_next_byte(bus),
        }
    }

    /// Store into an 8-bit operand. `(HL)` writes the bus; an immediate is not writable.
    pub fn set_register(
        &mut self,
        target: Target,
        value: u8,
        bus: &mut dyn MemoryBus,
    ) -> Result<(), CpuError> {
        match target {
            Target::A => self.a = value,
            Target::B => self.b = value,
            Target::C => self.c = value,
            Target::D => self.d = value,
            Target::E => self.e = value,
            Target::H => self.h = value,
            Target::L => self.l = value,
            Target::HLI => bus.write_byte(self.hl(), value),
            Target::N8 => {
                return Err(CpuError::InvalidOperand {
                    operand: target.to_string(),
                    pc: self.pc,
                })
            }
        }
        Ok(())
    }
}
