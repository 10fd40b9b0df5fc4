//! Instruction decoder for the disassembler

use crate::addressing::AddressingMode;
use crate::disassembler::Instruction;
use crate::encoding::InstructionWord;
use crate::opcodes::Opcode;

/// Decode a single instruction word.
///
/// Unassigned opcodes decode to a `.word` pseudo-instruction carrying the raw
/// value.
pub fn decode_word(word: InstructionWord, address: u16) -> Instruction {
    match Opcode::from_byte(word.opcode_byte()) {
        Some(opcode) => Instruction {
            address,
            word,
            mnemonic: opcode.mnemonic(),
            addressing_mode: opcode.addressing_mode(),
        },
        None => Instruction {
            address,
            word,
            mnemonic: ".word",
            addressing_mode: AddressingMode::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_movi() {
        let instr = decode_word(InstructionWord::new(0x21, 1, 0x0042), 0x0010);

        assert_eq!(instr.address, 0x0010);
        assert_eq!(instr.mnemonic, "MOVI");
        assert_eq!(instr.addressing_mode, AddressingMode::RegImm);
        assert_eq!(instr.word.immediate(), 0x0042);
    }

    #[test]
    fn test_decode_unassigned() {
        let instr = decode_word(InstructionWord(0xDEAD_BEFF), 0);

        assert_eq!(instr.mnemonic, ".word");
        assert_eq!(instr.addressing_mode, AddressingMode::None);
    }
}
