//! Instruction encoder for the assembler
//!
//! Packs parsed operands into an [`InstructionWord`]. Label operands are
//! encoded as zero and reported back so the caller can record a reference.

use crate::assembler::parser::{Operands, Value};
use crate::encoding::InstructionWord;
use crate::opcodes::Opcode;

/// Encode an instruction.
///
/// Returns the word and, if the immediate is a label, the label name.
///
/// ```
/// use vm16::assembler::encoder::encode_instruction;
/// use vm16::assembler::parser::{Operands, Value};
/// use vm16::{Opcode, Register};
///
/// let operands = Operands::Imm(Value::Label("main".to_string()));
/// let (word, label) = encode_instruction(Opcode::Jmp, &operands);
/// assert_eq!(word.to_bytes(), [0x40, 0x00, 0x00, 0x00]);
/// assert_eq!(label, Some("main"));
///
/// let (word, _) = encode_instruction(Opcode::Add, &Operands::RegReg(Register::Az, Register::Bz));
/// assert_eq!(word.to_bytes(), [0x01, 0x01, 0x02, 0x00]);
/// ```
pub fn encode_instruction(opcode: Opcode, operands: &Operands) -> (InstructionWord, Option<&str>) {
    let code = opcode.code();

    let (reg1, operand, value) = match operands {
        Operands::None => (0, 0, None),
        Operands::Reg(reg) => (reg.index(), 0, None),
        Operands::RegReg(dest, src) => (dest.index(), src.index() as u16, None),
        Operands::RegImm(reg, value) => (reg.index(), 0, Some(value)),
        Operands::Imm(value) => (0, 0, Some(value)),
    };

    match value {
        Some(Value::Literal(imm)) => (InstructionWord::new(code, reg1, *imm), None),
        Some(Value::Label(name)) => (InstructionWord::new(code, reg1, 0), Some(name.as_str())),
        None => (InstructionWord::new(code, reg1, operand), None),
    }
}
