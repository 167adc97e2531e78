use super::*;
use crate::cpu::disasm::disassemble;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test]
fn illegal_opcodes_decode_as_illegal() {
    for opcode in 0..=0xFFu8 {
        let illegal = ILLEGAL_OPCODES.contains(&opcode);
        assert_eq!(
            decode(opcode, false).is_illegal(),
            illegal,
            "opcode {opcode:#04X}"
        );
    }
}

#[test]
fn cb_table_is_fully_populated() {
    for opcode in 0..=0xFFu8 {
        let instruction = decode(opcode, true);
        assert!(!instruction.is_illegal(), "CB {opcode:#04X}");
        assert_eq!(instruction.taken_cycles, 0);
    }
}

#[test]
fn only_prefix_byte_decodes_as_prefix() {
    let prefixes: Vec<u8> = (0..=0xFFu8)
        .filter(|&op| decode(op, false).kind == InstructionKind::Prefix)
        .collect();
    assert_eq!(prefixes, vec![CB_PREFIX]);
}

#[test_case(0x00, "NOP", 4, 0)]
#[test_case(0x01, "LD BC,n16", 12, 0)]
#[test_case(0x06, "LD B,n8", 8, 0)]
#[test_case(0x08, "LD (a16),SP", 20, 0)]
#[test_case(0x10, "STOP n8", 4, 0)]
#[test_case(0x18, "JR e8", 8, 4)]
#[test_case(0x20, "JR NZ,e8", 8, 4)]
#[test_case(0x22, "LD (HL+),A", 8, 0)]
#[test_case(0x27, "DAA", 4, 0)]
#[test_case(0x34, "INC (HL)", 12, 0)]
#[test_case(0x36, "LD (HL),n8", 12, 0)]
#[test_case(0x3A, "LD A,(HL-)", 8, 0)]
#[test_case(0x41, "LD B,C", 4, 0)]
#[test_case(0x46, "LD B,(HL)", 8, 0)]
#[test_case(0x76, "HALT", 4, 0)]
#[test_case(0x86, "ADD A,(HL)", 8, 0)]
#[test_case(0x9F, "SBC A,A", 4, 0)]
#[test_case(0xAF, "XOR A", 4, 0)]
#[test_case(0xC0, "RET NZ", 8, 12)]
#[test_case(0xC1, "POP BC", 12, 0)]
#[test_case(0xC3, "JP a16", 12, 4)]
#[test_case(0xC5, "PUSH BC", 16, 0)]
#[test_case(0xC9, "RET", 4, 12)]
#[test_case(0xCC, "CALL Z,a16", 12, 12)]
#[test_case(0xCD, "CALL a16", 12, 12)]
#[test_case(0xD9, "RETI", 16, 0)]
#[test_case(0xDA, "JP C,a16", 12, 4)]
#[test_case(0xE0, "LDH (a8),A", 12, 0)]
#[test_case(0xE2, "LD (C),A", 8, 0)]
#[test_case(0xE8, "ADD SP,e8", 16, 0)]
#[test_case(0xE9, "JP HL", 4, 0)]
#[test_case(0xEA, "LD (a16),A", 16, 0)]
#[test_case(0xF1, "POP AF", 12, 0)]
#[test_case(0xF8, "LD HL,SP+e8", 12, 0)]
#[test_case(0xF9, "LD SP,HL", 8, 0)]
#[test_case(0xFB, "EI", 4, 0)]
#[test_case(0xFE, "CP n8", 8, 0)]
#[test_case(0xFF, "RST $38", 16, 0)]
fn unprefixed_descriptor(opcode: u8, mnemonic: &str, cycles: u32, taken: u32) {
    let instruction = decode(opcode, false);
    assert_eq!(instruction.to_string(), mnemonic);
    assert_eq!(instruction.cycles, cycles);
    assert_eq!(instruction.taken_cycles, taken);
}

#[test_case(0x00, "RLC B", 8)]
#[test_case(0x06, "RLC (HL)", 16)]
#[test_case(0x37, "SWAP A", 8)]
#[test_case(0x3E, "SRL (HL)", 16)]
#[test_case(0x46, "BIT 0,(HL)", 12)]
#[test_case(0x7C, "BIT 7,H", 8)]
#[test_case(0x86, "RES 0,(HL)", 16)]
#[test_case(0xFF, "SET 7,A", 8)]
fn prefixed_descriptor(opcode: u8, mnemonic: &str, cycles: u32) {
    let instruction = decode(opcode, true);
    assert_eq!(instruction.to_string(), mnemonic);
    assert_eq!(instruction.cycles, cycles);
}

#[test_case(0x00, 0)]
#[test_case(0x01, 2)]
#[test_case(0x06, 1)]
#[test_case(0x08, 2)]
#[test_case(0x10, 1)]
#[test_case(0x18, 1)]
#[test_case(0xC6, 1)]
#[test_case(0xCD, 2)]
#[test_case(0xE0, 1)]
#[test_case(0xE2, 0)]
#[test_case(0xE8, 1)]
#[test_case(0xFA, 2)]
fn immediate_lengths(opcode: u8, len: u16) {
    assert_eq!(decode(opcode, false).immediate_len(), len);
}

#[test]
fn register_loads_cost_four_unless_memory() {
    for opcode in 0x40..=0x7Fu8 {
        let instruction = decode(opcode, false);
        let InstructionKind::Load(dst, src) = instruction.kind else {
            assert_eq!(opcode, 0x76);
            continue;
        };
        let expected = if dst.is_memory() || src.is_memory() { 8 } else { 4 };
        assert_eq!(instruction.cycles, expected, "opcode {opcode:#04X}");
    }
}

#[test]
fn disassembly_listing() {
    let program = [
        0x31, 0xFE, 0xFF, // LD SP
        0x3E, 0x01, // LD A
        0xE0, 0x40, // LDH
        0x18, 0xFE, // JR
        0xCB, 0x7C, // BIT
        0x20, 0xFB, // JR NZ
        0xC9, // RET
    ];
    let listing: Vec<String> = disassemble(&program, 0x0000, usize::MAX)
        .iter()
        .map(ToString::to_string)
        .collect();
    insta::assert_snapshot!(listing.join("\n"), @r###"
    0000  31 FE FF  LD SP,$FFFE
    0003  3E 01     LD A,$01
    0005  E0 40     LDH ($FF00+$40),A
    0007  18 FE     JR $0007
    0009  CB 7C     BIT 7,H
    000B  20 FB     JR NZ,$0008
    000D  C9        RET
    "###);
}

#[test]
fn disassembly_signed_offsets_and_limits() {
    let program = [0xF8, 0xFE, 0xE8, 0x08, 0x00, 0x00];
    let lines = disassemble(&program, 0x0150, 2);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, "LD HL,SP-2");
    assert_eq!(lines[1].address, 0x0152);
    assert_eq!(lines[1].text, "ADD SP,+8");
}

#[test]
fn disassembly_truncated_tail() {
    let lines = disassemble(&[0xC3, 0x00], 0, 8);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].bytes, vec![0xC3, 0x00]);
    assert_eq!(lines[0].text, "JP a16");
}
