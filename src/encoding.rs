//! # Instruction Word Encoding
//!
//! Every instruction is a single 32-bit little-endian word. This module is the
//! one place that knows how the fields are packed, so the CPU decoder, the
//! assembler's encoder and the disassembler cannot drift apart.
//!
//! | Byte | Field |
//! |------|-------|
//! | 0    | opcode |
//! | 1    | first register index (0 when unused) |
//! | 2-3  | second register index (low byte only) or 16-bit immediate |

/// Size of one encoded instruction in bytes.
pub const INSTRUCTION_SIZE: usize = 4;

/// Offset of the 16-bit immediate field within an instruction word.
///
/// The linker patches label references at this offset from the start of
/// the referencing instruction.
pub const IMMEDIATE_OFFSET: usize = 2;

/// A raw 32-bit instruction word.
///
/// # Examples
///
/// ```
/// use vm16::InstructionWord;
///
/// // MOVI AZ, 0x1234
/// let word = InstructionWord::new(0x21, 1, 0x1234);
/// assert_eq!(word.to_bytes(), [0x21, 0x01, 0x34, 0x12]);
/// assert_eq!(word.opcode_byte(), 0x21);
/// assert_eq!(word.reg1(), 1);
/// assert_eq!(word.immediate(), 0x1234);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionWord(pub u32);

impl InstructionWord {
    /// Packs an opcode, a first-register index and a 16-bit operand field.
    pub fn new(opcode: u8, reg1: u8, operand: u16) -> Self {
        Self(opcode as u32 | (reg1 as u32) << 8 | (operand as u32) << 16)
    }

    /// Combines two 16-bit halves as fetched from memory (low word first).
    pub fn from_halves(low: u16, high: u16) -> Self {
        Self((high as u32) << 16 | low as u32)
    }

    /// Reads a word from the first four bytes of `bytes`.
    ///
    /// Returns `None` if fewer than four bytes are available.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; INSTRUCTION_SIZE] = bytes.get(..INSTRUCTION_SIZE)?.try_into().ok()?;
        Some(Self(u32::from_le_bytes(raw)))
    }

    /// Little-endian byte representation, as stored in memory.
    pub fn to_bytes(self) -> [u8; INSTRUCTION_SIZE] {
        self.0.to_le_bytes()
    }

    /// Byte 0: the opcode.
    pub fn opcode_byte(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Byte 1: the first (destination) register index.
    pub fn reg1(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Byte 2: the second (source) register index.
    pub fn reg2(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Bytes 2-3: the 16-bit immediate or address.
    pub fn immediate(self) -> u16 {
        ((self.0 >> 16) & 0xFFFF) as u16
    }
}
