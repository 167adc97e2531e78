//! Arithmetic and logic unit.
//!
//! Every operation is a pure function from operands (and incoming flags where
//! they matter) to a result and the new flag set. The executor in `mod.rs`
//! does the register and bus plumbing.

use crate::cpu::registers::Flags;

/// ADD/ADC: H on carry out of bit 3, C on carry out of bit 7
pub fn add(a: u8, b: u8, carry_in: bool) -> (u8, Flags) {
    let carry = u8::from(carry_in);
    let sum = u16::from(a) + u16::from(b) + u16::from(carry);
    let result = sum as u8;
    let half = (a & 0x0F) + (b & 0x0F) + carry > 0x0F;
    (result, Flags::from_bools(result == 0, false, half, sum > 0xFF))
}

/// SUB/SBC/CP: H on borrow from bit 4, C on borrow from bit 8
pub fn sub(a: u8, b: u8, carry_in: bool) -> (u8, Flags) {
    let carry = u8::from(carry_in);
    let result = a.wrapping_sub(b).wrapping_sub(carry);
    let half = u16::from(a & 0x0F) < u16::from(b & 0x0F) + u16::from(carry);
    let borrow = u16::from(a) < u16::from(b) + u16::from(carry);
    (result, Flags::from_bools(result == 0, true, half, borrow))
}

pub fn and(a: u8, b: u8) -> (u8, Flags) {
    let result = a & b;
    (result, Flags::from_bools(result == 0, false, true, false))
}

pub fn or(a: u8, b: u8) -> (u8, Flags) {
    let result = a | b;
    (result, Flags::from_bools(result == 0, false, false, false))
}

pub fn xor(a: u8, b: u8) -> (u8, Flags) {
    let result = a ^ b;
    (result, Flags::from_bools(result == 0, false, false, false))
}

/// INC keeps C
pub fn inc(value: u8, flags: Flags) -> (u8, Flags) {
    let result = value.wrapping_add(1);
    let half = value & 0x0F == 0x0F;
    (
        result,
        Flags::from_bools(result == 0, false, half, flags.contains(Flags::CARRY)),
    )
}

/// DEC keeps C
pub fn dec(value: u8, flags: Flags) -> (u8, Flags) {
    let result = value.wrapping_sub(1);
    let half = value & 0x0F == 0x00;
    (
        result,
        Flags::from_bools(result == 0, true, half, flags.contains(Flags::CARRY)),
    )
}

/// ADD HL,rr: Z kept, H from bit 11, C from bit 15
pub fn add16(hl: u16, value: u16, flags: Flags) -> (u16, Flags) {
    let sum = u32::from(hl) + u32::from(value);
    let half = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
    (
        sum as u16,
        Flags::from_bools(flags.contains(Flags::ZERO), false, half, sum > 0xFFFF),
    )
}

/// SP plus a signed byte, shared by ADD SP,e8 and LD HL,SP+e8.
/// Z and N are cleared; H and C come from the unsigned low-byte addition.
pub fn add_sp(sp: u16, offset: i8) -> (u16, Flags) {
    let value = offset as i16 as u16;
    let half = (sp & 0x000F) + (value & 0x000F) > 0x000F;
    let carry = (sp & 0x00FF) + (value & 0x00FF) > 0x00FF;
    (
        sp.wrapping_add(value),
        Flags::from_bools(false, false, half, carry),
    )
}

/// Decimal adjust A after a BCD addition or subtraction
pub fn daa(a: u8, flags: Flags) -> (u8, Flags) {
    let subtract = flags.contains(Flags::SUBTRACT);
    let mut correction = 0;
    let mut carry = false;
    if flags.contains(Flags::HALF_CARRY) || (!subtract && a & 0x0F > 0x09) {
        correction |= 0x06;
    }
    if flags.contains(Flags::CARRY) || (!subtract && a > 0x99) {
        correction |= 0x60;
        carry = true;
    }
    let result = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };
    (result, Flags::from_bools(result == 0, subtract, false, carry))
}

/// Shift/rotate result: Z from the result, C from the bit shifted out
fn shifted(result: u8, carry_out: bool) -> (u8, Flags) {
    (result, Flags::from_bools(result == 0, false, false, carry_out))
}

pub fn rlc(value: u8) -> (u8, Flags) {
    shifted(value.rotate_left(1), value & 0x80 != 0)
}

pub fn rrc(value: u8) -> (u8, Flags) {
    shifted(value.rotate_right(1), value & 0x01 != 0)
}

/// Rotate left through carry
pub fn rl(value: u8, carry_in: bool) -> (u8, Flags) {
    shifted((value << 1) | u8::from(carry_in), value & 0x80 != 0)
}

/// Rotate right through carry
pub fn rr(value: u8, carry_in: bool) -> (u8, Flags) {
    shifted((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0)
}

pub fn sla(value: u8) -> (u8, Flags) {
    shifted(value << 1, value & 0x80 != 0)
}

/// Arithmetic shift right, bit 7 is kept
pub fn sra(value: u8) -> (u8, Flags) {
    shifted((value >> 1) | (value & 0x80), value & 0x01 != 0)
}

pub fn srl(value: u8) -> (u8, Flags) {
    shifted(value >> 1, value & 0x01 != 0)
}

pub fn swap(value: u8) -> (u8, Flags) {
    shifted(value.rotate_left(4), false)
}

/// BIT b: Z = !bit, N = 0, H = 1, C kept
pub fn bit(index: u8, value: u8, flags: Flags) -> Flags {
    Flags::from_bools(
        value & (1 << (index & 7)) == 0,
        false,
        true,
        flags.contains(Flags::CARRY),
    )
}

/// Accumulator rotates (RLCA/RRCA/RLA/RRA) always clear Z
pub fn accumulator(result: (u8, Flags)) -> (u8, Flags) {
    let (value, mut flags) = result;
    flags.remove(Flags::ZERO);
    (value, flags)
}
