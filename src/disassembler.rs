//! Disassembler Module
//!
//! Converts instruction words back into assembler text. Decoding is driven by
//! the same opcode catalogue the CPU and assembler use, so a disassembled
//! listing re-assembles to the same bytes (label references show up as their
//! resolved addresses).

pub mod decoder;
pub mod formatter;

use crate::addressing::AddressingMode;
use crate::encoding::{InstructionWord, INSTRUCTION_SIZE};

/// A single disassembled instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Address of the first byte of the word
    pub address: u16,

    /// The raw word
    pub word: InstructionWord,

    /// Mnemonic, or `.word` for an unassigned opcode
    pub mnemonic: &'static str,

    /// Operand shape used for formatting
    pub addressing_mode: AddressingMode,
}

/// Options controlling disassembly output
#[derive(Debug, Clone, Copy, Default)]
pub struct DisassemblyOptions {
    /// Address of the first byte (affects address display)
    pub start_address: u16,

    /// Whether to show the raw bytes next to each line
    pub hex_dump: bool,
}

/// Disassemble a byte slice into a vector of instructions.
///
/// Trailing bytes that do not fill a whole word are ignored; use
/// [`formatter::format_listing`] to see them.
pub fn disassemble(bytes: &[u8], options: DisassemblyOptions) -> Vec<Instruction> {
    bytes
        .chunks_exact(INSTRUCTION_SIZE)
        .enumerate()
        .filter_map(|(i, chunk)| {
            let address = options
                .start_address
                .wrapping_add((i * INSTRUCTION_SIZE) as u16);
            InstructionWord::from_bytes(chunk).map(|word| decoder::decode_word(word, address))
        })
        .collect()
}

/// Formats a single word as assembler text, e.g. `ADDI AZ, 0x0003`.
///
/// ```
/// use vm16::{disassembler, InstructionWord};
///
/// let text = disassembler::format_word(InstructionWord::new(0x02, 1, 3));
/// assert_eq!(text, "ADDI AZ, 0x0003");
/// ```
pub fn format_word(word: InstructionWord) -> String {
    formatter::format_instruction(&decoder::decode_word(word, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_empty() {
        let instructions = disassemble(&[], DisassemblyOptions::default());
        assert_eq!(instructions.len(), 0);
    }

    #[test]
    fn test_disassemble_addresses() {
        let bytes = [0x00, 0, 0, 0, 0x58, 0, 0, 0, 0xAA];
        let options = DisassemblyOptions {
            start_address: 0x0100,
            hex_dump: false,
        };
        let instructions = disassemble(&bytes, options);

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].address, 0x0100);
        assert_eq!(instructions[0].mnemonic, "WCYL");
        assert_eq!(instructions[1].address, 0x0104);
        assert_eq!(instructions[1].mnemonic, "STSD");
    }
}
