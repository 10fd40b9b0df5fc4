//! # Addressing Modes
//!
//! Every opcode has exactly one operand shape. The shape fixes how many
//! arguments the assembler expects and which bytes of the instruction word
//! the CPU reads.

use std::fmt;

/// Operand shape of an instruction.
///
/// # Operand Bytes
///
/// - **None**: opcode only
/// - **Reg**: byte 1
/// - **RegReg**: bytes 1 and 2
/// - **RegImm**: byte 1 and bytes 2-3
/// - **Imm**: bytes 2-3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand.
    ///
    /// Examples: RET, STSD, PUSHF
    None,

    /// One register.
    ///
    /// Example: INC AZ
    Reg,

    /// Destination register, source register.
    ///
    /// Example: ADD AZ, BZ
    RegReg,

    /// Register plus a 16-bit immediate, address or label.
    ///
    /// Example: MOVI AZ, 0x10
    RegImm,

    /// A 16-bit immediate, address or label.
    ///
    /// Example: JMP loop
    Imm,
}

impl AddressingMode {
    /// Number of source-level arguments this mode takes.
    ///
    /// ```
    /// use vm16::AddressingMode;
    ///
    /// assert_eq!(AddressingMode::None.arity(), 0);
    /// assert_eq!(AddressingMode::RegImm.arity(), 2);
    /// ```
    pub fn arity(self) -> usize {
        match self {
            AddressingMode::None => 0,
            AddressingMode::Reg | AddressingMode::Imm => 1,
            AddressingMode::RegReg | AddressingMode::RegImm => 2,
        }
    }

    /// True if the instruction word carries a 16-bit immediate that may be a
    /// label reference.
    pub fn has_immediate(self) -> bool {
        matches!(self, AddressingMode::RegImm | AddressingMode::Imm)
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AddressingMode::None => "none",
            AddressingMode::Reg => "register",
            AddressingMode::RegReg => "register, register",
            AddressingMode::RegImm => "register, immediate",
            AddressingMode::Imm => "immediate",
        };
        f.write_str(name)
    }
}
