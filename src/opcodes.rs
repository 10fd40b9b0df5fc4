//! # Opcode Catalogue
//!
//! The single source of truth for the instruction set: every opcode's numeric
//! code, mnemonic and addressing mode. The CPU dispatches on [`Opcode`], the
//! assembler looks mnemonics up here, and the disassembler formats from here,
//! so the three can never disagree about the encoding.
//!
//! Codes are grouped by family:
//!
//! - `0x00`: WCYL (wait one cycle)
//! - `0x01-0x0D`: arithmetic and compare
//! - `0x10-0x1A`: bitwise and shifts
//! - `0x20-0x2D`: data movement (16-bit and byte forms)
//! - `0x30-0x36`: stack, CALL/RET
//! - `0x40-0x4D`: jumps and loops
//! - `0x51-0x58`: port I/O and flag control

use crate::addressing::AddressingMode;

/// Static metadata for one opcode.
///
/// # Examples
///
/// ```
/// use vm16::{AddressingMode, Opcode};
///
/// let add = Opcode::from_byte(0x01).unwrap();
/// assert_eq!(add, Opcode::Add);
/// assert_eq!(add.mnemonic(), "ADD");
/// assert_eq!(add.addressing_mode(), AddressingMode::RegReg);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// The opcode this entry describes.
    pub opcode: Opcode,

    /// Numeric code stored in byte 0 of the instruction word.
    pub code: u8,

    /// Upper-case assembler mnemonic.
    pub mnemonic: &'static str,

    /// Operand shape.
    pub addressing_mode: AddressingMode,
}

macro_rules! opcode_table {
    ($( $variant:ident = $code:literal, $mnemonic:literal, $mode:ident; )*) => {
        /// Closed enumeration of every defined opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $( $variant = $code, )*
        }

        /// Every defined opcode, in code order.
        pub const OPCODE_TABLE: &[OpcodeMetadata] = &[
            $(
                OpcodeMetadata {
                    opcode: Opcode::$variant,
                    code: $code,
                    mnemonic: $mnemonic,
                    addressing_mode: AddressingMode::$mode,
                },
            )*
        ];

        impl Opcode {
            /// Decodes an opcode byte. Returns `None` for unassigned codes.
            pub fn from_byte(byte: u8) -> Option<Opcode> {
                match byte {
                    $( $code => Some(Opcode::$variant), )*
                    _ => None,
                }
            }

            /// Upper-case mnemonic.
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $( Opcode::$variant => $mnemonic, )*
                }
            }

            /// Operand shape.
            pub fn addressing_mode(self) -> AddressingMode {
                match self {
                    $( Opcode::$variant => AddressingMode::$mode, )*
                }
            }
        }
    };
}

opcode_table! {
    Wcyl   = 0x00, "WCYL",   None;

    Add    = 0x01, "ADD",    RegReg;
    Addi   = 0x02, "ADDI",   RegImm;
    Sub    = 0x03, "SUB",    RegReg;
    Subi   = 0x04, "SUBI",   RegImm;
    Mul    = 0x05, "MUL",    RegReg;
    Muli   = 0x06, "MULI",   RegImm;
    Div    = 0x07, "DIV",    RegReg;
    Divi   = 0x08, "DIVI",   RegImm;
    Inc    = 0x09, "INC",    Reg;
    Dec    = 0x0A, "DEC",    Reg;
    Neg    = 0x0B, "NEG",    Reg;
    Cmp    = 0x0C, "CMP",    RegReg;
    Cmpi   = 0x0D, "CMPI",   RegImm;

    And    = 0x10, "AND",    RegReg;
    Andi   = 0x11, "ANDI",   RegImm;
    Or     = 0x12, "OR",     RegReg;
    Ori    = 0x13, "ORI",    RegImm;
    Xor    = 0x14, "XOR",    RegReg;
    Xori   = 0x15, "XORI",   RegImm;
    Shl    = 0x16, "SHL",    RegReg;
    Shli   = 0x17, "SHLI",   RegImm;
    Shr    = 0x18, "SHR",    RegReg;
    Shri   = 0x19, "SHRI",   RegImm;
    Not    = 0x1A, "NOT",    Reg;

    Mov    = 0x20, "MOV",    RegReg;
    Movi   = 0x21, "MOVI",   RegImm;
    Load   = 0x22, "LOAD",   RegReg;
    Loadi  = 0x23, "LOADI",  RegImm;
    Stor   = 0x24, "STOR",   RegReg;
    Stori  = 0x25, "STORI",  RegImm;
    Copy   = 0x26, "COPY",   RegReg;
    Copyi  = 0x27, "COPYI",  RegImm;
    Loadb  = 0x28, "LOADB",  RegReg;
    Loadbi = 0x29, "LOADBI", RegImm;
    Storb  = 0x2A, "STORB",  RegReg;
    Storbi = 0x2B, "STORBI", RegImm;
    Copyb  = 0x2C, "COPYB",  RegReg;
    Copybi = 0x2D, "COPYBI", RegImm;

    Push   = 0x30, "PUSH",   Reg;
    Pushi  = 0x31, "PUSHI",  Imm;
    Pop    = 0x32, "POP",    Reg;
    Pushf  = 0x33, "PUSHF",  None;
    Popf   = 0x34, "POPF",   None;
    Call   = 0x35, "CALL",   Imm;
    Ret    = 0x36, "RET",    None;

    Jmp    = 0x40, "JMP",    Imm;
    Je     = 0x41, "JE",     Imm;
    Jne    = 0x42, "JNE",    Imm;
    Jg     = 0x43, "JG",     Imm;
    Jge    = 0x44, "JGE",    Imm;
    Jl     = 0x45, "JL",     Imm;
    Jle    = 0x46, "JLE",    Imm;
    Jer    = 0x47, "JER",    Imm;
    Jner   = 0x48, "JNER",   Imm;
    Jxp    = 0x49, "JXP",    Imm;
    Jnxp   = 0x4A, "JNXP",   Imm;
    Lop    = 0x4B, "LOP",    Imm;
    Lope   = 0x4C, "LOPE",   Imm;
    Lopne  = 0x4D, "LOPNE",  Imm;

    In     = 0x51, "IN",     RegImm;
    Out    = 0x52, "OUT",    RegImm;

    Cler   = 0x53, "CLER",   None;
    Clxp   = 0x54, "CLXP",   None;
    Ster   = 0x55, "STER",   None;
    Stxp   = 0x56, "STXP",   None;
    Strs   = 0x57, "STRS",   None;
    Stsd   = 0x58, "STSD",   None;
}

impl Opcode {
    /// Numeric code stored in byte 0 of the instruction word.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up an opcode by mnemonic, ignoring ASCII case.
    ///
    /// ```
    /// use vm16::Opcode;
    ///
    /// assert_eq!(Opcode::from_mnemonic("movi"), Some(Opcode::Movi));
    /// assert_eq!(Opcode::from_mnemonic("LDA"), None);
    /// ```
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        OPCODE_TABLE
            .iter()
            .find(|meta| meta.mnemonic.eq_ignore_ascii_case(mnemonic))
            .map(|meta| meta.opcode)
    }
}
