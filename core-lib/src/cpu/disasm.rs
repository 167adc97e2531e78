//! Linear disassembly over a byte slice, using the decoder tables.

use super::opcodes::{decode, Instruction, CB_PREFIX};
use std::fmt;

/// One decoded instruction with its address and raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledLine {
    pub address: u16,
    pub bytes: Vec<u8>,
    pub instruction: Instruction,
    pub text: String,
}

impl fmt::Display for DisassembledLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
        write!(f, "{:04X}  {:<9} {}", self.address, hex.join(" "), self.text)
    }
}

/// Replace the operand placeholder in a mnemonic with the decoded immediate
fn render(instruction: Instruction, address: u16, immediate: &[u8]) -> String {
    let text = instruction.to_string();
    match *immediate {
        [lo, hi] => {
            let value = u16::from_le_bytes([lo, hi]);
            text.replacen("a16", &format!("${value:04X}"), 1)
                .replacen("n16", &format!("${value:04X}"), 1)
        }
        [byte] => {
            if text.contains("e8") {
                let offset = byte as i8;
                if text.starts_with("JR") {
                    // show the resolved target rather than the raw displacement
                    let target = address
                        .wrapping_add(2)
                        .wrapping_add_signed(i16::from(offset));
                    text.replacen("e8", &format!("${target:04X}"), 1)
                } else {
                    let signed = format!("{offset:+}");
                    text.replacen("+e8", &signed, 1).replacen("e8", &signed, 1)
                }
            } else if text.contains("(a8)") {
                text.replacen("(a8)", &format!("($FF00+${byte:02X})"), 1)
            } else {
                text.replacen("n8", &format!("${byte:02X}"), 1)
            }
        }
        _ => text,
    }
}

/// Decode `bytes` as code starting at `origin`, stopping after `limit`
/// instructions or at the end of the slice. A truncated final instruction is
/// shown with whatever bytes remain.
pub fn disassemble(bytes: &[u8], origin: u16, limit: usize) -> Vec<DisassembledLine> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    while offset < bytes.len() && lines.len() < limit {
        let address = origin.wrapping_add(offset as u16);
        let opcode = bytes[offset];
        let (instruction, opcode_len) = if opcode == CB_PREFIX {
            match bytes.get(offset + 1) {
                Some(&cb) => (decode(cb, true), 2),
                None => (decode(opcode, false), 1),
            }
        } else {
            (decode(opcode, false), 1)
        };

        let end = (offset + opcode_len + usize::from(instruction.immediate_len())).min(bytes.len());
        let raw = &bytes[offset..end];
        let immediate = raw.get(opcode_len..).unwrap_or_default();
        lines.push(DisassembledLine {
            address,
            bytes: raw.to_vec(),
            instruction,
            text: render(instruction, address, immediate),
        });
        offset = end;
    }

    lines
}
