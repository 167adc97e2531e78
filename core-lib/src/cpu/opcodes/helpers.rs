//! Stack helpers shared by PUSH/POP, CALL/RET, RST and interrupt dispatch.

use crate::bus::MemoryBus;
use crate::cpu::registers::Registers;

/// Push a word: SP -= 2, high byte at SP+1, low byte at SP
pub(crate) fn push_word(regs: &mut Registers, bus: &mut dyn MemoryBus, value: u16) {
    let [lo, hi] = value.to_le_bytes();
    regs.sp = regs.sp.wrapping_sub(1);
    bus.write_byte(regs.sp, hi);
    regs.sp = regs.sp.wrapping_sub(1);
    bus.write_byte(regs.sp, lo);
}

/// Pop a word pushed by [`push_word`], SP += 2
pub(crate) fn pop_word(regs: &mut Registers, bus: &dyn MemoryBus) -> u16 {
    let lo = bus.read_byte(regs.sp);
    regs.sp = regs.sp.wrapping_add(1);
    let hi = bus.read_byte(regs.sp);
    regs.sp = regs.sp.wrapping_add(1);
    u16::from_le_bytes([lo, hi])
}
