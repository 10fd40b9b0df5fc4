//! Fuzz target for the disassembler.
//!
//! Decodes arbitrary images and checks that every word with a known opcode
//! formats to text the assembler turns back into the same operand fields.

#![no_main]

use libfuzzer_sys::arbitrary::{Result, Unstructured};
use libfuzzer_sys::fuzz_target;
use vm16::assembler::assemble_instruction;
use vm16::disassembler::{disassemble, formatter, DisassemblyOptions};
use vm16::{AddressingMode, InstructionWord, INSTRUCTION_SIZE};

/// The bits of a word that its addressing mode actually uses.
fn significant(word: InstructionWord, mode: AddressingMode) -> (u8, u8, u16) {
    match mode {
        AddressingMode::None => (word.opcode_byte(), 0, 0),
        AddressingMode::Reg => (word.opcode_byte(), word.reg1(), 0),
        AddressingMode::RegReg => (word.opcode_byte(), word.reg1(), u16::from(word.reg2())),
        AddressingMode::RegImm => (word.opcode_byte(), word.reg1(), word.immediate()),
        AddressingMode::Imm => (word.opcode_byte(), 0, word.immediate()),
    }
}

fn check(data: &[u8]) -> Result<()> {
    let mut u = Unstructured::new(data);
    let options = DisassemblyOptions {
        start_address: u.arbitrary()?,
        hex_dump: u.arbitrary()?,
    };
    let bytes = u.take_rest();

    let instructions = disassemble(bytes, options);
    assert_eq!(instructions.len(), bytes.len() / INSTRUCTION_SIZE);

    for instr in &instructions {
        if instr.mnemonic == ".word" {
            continue;
        }
        let text = formatter::format_instruction(instr);
        // Register fields past MO format as R<n>, which does not assemble
        if let Ok(word) = assemble_instruction(&text) {
            assert_eq!(
                significant(word, instr.addressing_mode),
                significant(instr.word, instr.addressing_mode),
                "{}",
                text
            );
        }
    }

    let listing = formatter::format_listing(bytes, options);
    assert_eq!(
        listing.lines().count(),
        instructions.len() + bytes.len() % INSTRUCTION_SIZE
    );
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = check(data);
});
