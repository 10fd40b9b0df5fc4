//! Formatting functions for disassembled instructions

use std::fmt;

use crate::addressing::AddressingMode;
use crate::disassembler::{decoder, DisassemblyOptions, Instruction};
use crate::encoding::{InstructionWord, INSTRUCTION_SIZE};
use crate::registers::Register;

/// Format a single instruction as assembler text
pub fn format_instruction(instr: &Instruction) -> String {
    let operand = format_operand(instr);

    if operand.is_empty() {
        instr.mnemonic.to_string()
    } else {
        format!("{} {}", instr.mnemonic, operand)
    }
}

/// Register name, or `R<n>` for an index no assembler register maps to.
fn register_name(index: u8) -> String {
    match Register::from_index(index) {
        Some(reg) => reg.name().to_string(),
        None => format!("R{}", index),
    }
}

fn format_operand(instr: &Instruction) -> String {
    use AddressingMode::*;

    let word = instr.word;
    if instr.mnemonic == ".word" {
        return format!("0x{:08X}", word.0);
    }

    match instr.addressing_mode {
        None => String::new(),
        Reg => register_name(word.reg1()),
        RegReg => format!("{}, {}", register_name(word.reg1()), register_name(word.reg2())),
        RegImm => format!("{}, 0x{:04X}", register_name(word.reg1()), word.immediate()),
        Imm => format!("0x{:04X}", word.immediate()),
    }
}

/// Formats a whole image as a listing, one word per line.
///
/// Trailing bytes that do not fill a word are emitted as `.byte` lines.
///
/// ```
/// use vm16::disassembler::{formatter, DisassemblyOptions};
///
/// let listing = formatter::format_listing(&[0x09, 0x02, 0, 0], DisassemblyOptions::default());
/// assert_eq!(listing, "0000  INC BZ\n");
/// ```
pub fn format_listing(bytes: &[u8], options: DisassemblyOptions) -> String {
    Listing::new(bytes, options).to_string()
}

/// An image paired with listing options, rendered lazily through `Display`.
pub struct Listing<'a> {
    bytes: &'a [u8],
    options: DisassemblyOptions,
}

impl<'a> Listing<'a> {
    pub fn new(bytes: &'a [u8], options: DisassemblyOptions) -> Self {
        Listing { bytes, options }
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chunks = self.bytes.chunks_exact(INSTRUCTION_SIZE);
        let tail = chunks.remainder();
        let mut address = self.options.start_address;

        for chunk in chunks {
            let Some(word) = InstructionWord::from_bytes(chunk) else {
                continue;
            };
            let instr = decoder::decode_word(word, address);
            write!(f, "{:04X}  ", address)?;
            if self.options.hex_dump {
                write!(
                    f,
                    "{:02X} {:02X} {:02X} {:02X}  ",
                    chunk[0], chunk[1], chunk[2], chunk[3]
                )?;
            }
            writeln!(f, "{}", format_instruction(&instr))?;
            address = address.wrapping_add(INSTRUCTION_SIZE as u16);
        }

        for byte in tail {
            writeln!(f, "{:04X}  .byte 0x{:02X}", address, byte)?;
            address = address.wrapping_add(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(opcode: u8, reg1: u8, operand: u16) -> Instruction {
        decoder::decode_word(InstructionWord::new(opcode, reg1, operand), 0)
    }

    #[test]
    fn test_format_reg_reg() {
        assert_eq!(format_instruction(&instr(0x01, 1, 2)), "ADD AZ, BZ");
    }

    #[test]
    fn test_format_immediate() {
        assert_eq!(format_instruction(&instr(0x40, 0, 0x0100)), "JMP 0x0100");
        assert_eq!(format_instruction(&instr(0x52, 3, 0x0061)), "OUT CZ, 0x0061");
    }

    #[test]
    fn test_format_none() {
        assert_eq!(format_instruction(&instr(0x36, 0, 0)), "RET");
    }

    #[test]
    fn test_format_bad_register() {
        assert_eq!(format_instruction(&instr(0x09, 0x20, 0)), "INC R32");
    }

    #[test]
    fn test_format_unassigned_opcode() {
        assert_eq!(
            format_instruction(&instr(0xFF, 0x01, 0x0203)),
            ".word 0x020301FF"
        );
    }

    #[test]
    fn test_listing_with_hex_and_tail() {
        let options = DisassemblyOptions {
            start_address: 0,
            hex_dump: true,
        };
        let listing = format_listing(&[0x58, 0, 0, 0, 0x41], options);
        assert_eq!(listing, "0000  58 00 00 00  STSD\n0004  .byte 0x41\n");
    }

    #[test]
    fn test_listing_display_with_start_address() {
        let options = DisassemblyOptions {
            start_address: 0x0100,
            hex_dump: false,
        };
        let bytes = [0x36, 0, 0, 0, 0x58, 0, 0, 0];
        let listing = Listing::new(&bytes, options);
        assert_eq!(listing.to_string(), "0100  RET\n0104  STSD\n");
        assert_eq!(format!("{}", listing), format_listing(&bytes, options));
    }
}
