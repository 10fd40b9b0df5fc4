//! Assembler Module
//!
//! Converts assembly source into an [`ObjectFile`]: bytecode plus an address
//! table (labels defined here) and a reference table (label operands still to
//! be patched by the [`linker`](crate::linker)).
//!
//! # Source Format
//!
//! ```text
//! ; comments start with a semicolon
//! LOCATE start          ; define a label at the current offset
//!     MOVI  AZ, 0x0005  ; mnemonics and registers are case-insensitive
//!     ADDI  AZ, 3
//!     CALL  helper      ; labels may be used before they are defined
//!     STSD
//! LOCATE helper
//!     RET
//! LOCATE greeting
//!     STR   /Hello/     ; raw ASCII, no terminator
//!     U8    0           ; I8/U8/I16/U16 take one or more literals
//! ```
//!
//! Assembly is a single pass. Label operands are emitted as zero and recorded
//! in the reference table under the offset of their instruction; resolution
//! is always deferred to the linker, so forward and backward references are
//! handled the same way.
//!
//! The first error aborts assembly and is reported with its line number.

pub mod encoder;
pub mod lexer;
pub mod parser;
pub mod symbol_table;

use thiserror::Error;

use crate::encoding::{INSTRUCTION_SIZE, InstructionWord};
use crate::memory::MEMORY_SIZE;
use crate::object::ObjectFile;
use crate::opcodes::Opcode;
use crate::registers::Register;
use parser::{Directive, Statement};
use symbol_table::SymbolTable;

/// A symbol table entry mapping a label to an offset
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Label name (case-sensitive)
    pub name: String,

    /// Byte offset within the object
    pub address: u16,

    /// Source line where label was defined
    pub defined_at: usize,
}

/// An error encountered during assembly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct AssemblerError {
    /// Error type classification
    pub error_type: ErrorType,

    /// Line number where error occurred (1-indexed)
    pub line: usize,

    /// Human-readable error message
    pub message: String,
}

impl AssemblerError {
    pub fn new(error_type: ErrorType, line: usize, message: String) -> Self {
        Self {
            error_type,
            line,
            message,
        }
    }
}

/// Classification of assembly errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Not a known mnemonic or directive
    InvalidMnemonic,

    /// Wrong number of arguments for the addressing mode or directive
    ArgumentCount,

    /// Register-shaped argument is not a register name
    InvalidRegister,

    /// Literal does not fit the target width, or the program outgrew memory
    RangeError,

    /// Label collides with a mnemonic, directive or register name
    ReservedWord,

    /// Label has characters outside `[A-Za-z0-9_]` or starts with a digit
    InvalidLabel,

    /// Label defined twice in one source
    DuplicateLabel,

    /// `STR` without two delimiters or with unsupported characters
    MalformedString,

    /// Integer-list entry is not a literal
    SyntaxError,
}

/// True if `name` is a mnemonic, directive or register name in any case.
pub fn is_reserved(name: &str) -> bool {
    Opcode::from_mnemonic(name).is_some()
        || Directive::from_name(name).is_some()
        || Register::from_name(name).is_some()
}

/// Validate a label name
///
/// Labels must:
/// - Start with a letter or underscore
/// - Contain only ASCII alphanumeric characters and underscores
/// - Not be a reserved word, compared case-insensitively
pub fn validate_label(line: usize, name: &str) -> Result<(), AssemblerError> {
    let mut chars = name.chars();
    let well_formed = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        None => false,
    };

    if !well_formed {
        return Err(AssemblerError::new(
            ErrorType::InvalidLabel,
            line,
            format!("invalid immediate or label {}", name),
        ));
    }

    if is_reserved(name) {
        return Err(AssemblerError::new(
            ErrorType::ReservedWord,
            line,
            format!("forbidden keyword {}", name.to_ascii_uppercase()),
        ));
    }

    Ok(())
}

/// Assemble source code into an object file
///
/// # Examples
///
/// ```
/// use vm16::assembler::assemble;
///
/// let object = assemble("MOVI AZ, 5\nADDI AZ, 3\nSTSD\n").unwrap();
/// assert_eq!(object.bytecode, [
///     0x21, 0x01, 0x05, 0x00,
///     0x02, 0x01, 0x03, 0x00,
///     0x58, 0x00, 0x00, 0x00,
/// ]);
/// assert!(object.references.is_empty());
/// ```
///
/// Errors carry the offending line:
///
/// ```
/// use vm16::assembler::{assemble, ErrorType};
///
/// let err = assemble("WCYL\nADD AZ\n").unwrap_err();
/// assert_eq!(err.error_type, ErrorType::ArgumentCount);
/// assert_eq!(err.line, 2);
/// ```
pub fn assemble(source: &str) -> Result<ObjectFile, AssemblerError> {
    let mut object = ObjectFile::new();
    let mut symbols = SymbolTable::new();

    for (index, text) in source.lines().enumerate() {
        let line_number = index + 1;
        let Some(line) = parser::parse_line(line_number, text)? else {
            continue;
        };

        match line.statement {
            Statement::Locate(name) => {
                let offset = current_offset(&object, line_number)?;
                if let Err(existing) = symbols.add_symbol(name.clone(), offset, line_number) {
                    return Err(AssemblerError::new(
                        ErrorType::DuplicateLabel,
                        line_number,
                        format!("duplicate location {} (first defined on line {})", name, existing.defined_at),
                    ));
                }
            }
            Statement::Instruction { opcode, operands } => {
                let offset = current_offset(&object, line_number)?;
                let (word, label) = encoder::encode_instruction(opcode, &operands);
                if let Some(label) = label {
                    object.references.insert(offset, label.to_string());
                }
                emit(&mut object, &word.to_bytes(), line_number)?;
            }
            Statement::Data(bytes) => emit(&mut object, &bytes, line_number)?,
        }
    }

    object.addresses = symbols.to_address_table();
    tracing::debug!(
        "assembled {} bytes, {} labels, {} references",
        object.bytecode.len(),
        object.addresses.len(),
        object.references.len()
    );
    Ok(object)
}

/// Offset of the next byte, which must be addressable.
fn current_offset(object: &ObjectFile, line: usize) -> Result<u16, AssemblerError> {
    u16::try_from(object.bytecode.len()).map_err(|_| too_large(line))
}

fn emit(object: &mut ObjectFile, bytes: &[u8], line: usize) -> Result<(), AssemblerError> {
    if object.bytecode.len() + bytes.len() > MEMORY_SIZE {
        return Err(too_large(line));
    }
    object.bytecode.extend_from_slice(bytes);
    Ok(())
}

fn too_large(line: usize) -> AssemblerError {
    AssemblerError::new(
        ErrorType::RangeError,
        line,
        format!("program exceeds {} bytes", MEMORY_SIZE),
    )
}

/// Encodes a single instruction from text, for tools that need one word.
///
/// Label operands are not allowed since there is nothing to patch them.
pub fn assemble_instruction(text: &str) -> Result<InstructionWord, AssemblerError> {
    let object = assemble(text)?;
    if let Some((_, label)) = object.references.iter().next() {
        return Err(AssemblerError::new(
            ErrorType::InvalidLabel,
            1,
            format!("label {} cannot be used in a single instruction", label),
        ));
    }
    InstructionWord::from_bytes(&object.bytecode)
        .filter(|_| object.bytecode.len() == INSTRUCTION_SIZE)
        .ok_or_else(|| {
            AssemblerError::new(
                ErrorType::ArgumentCount,
                1,
                "expected exactly one instruction".to_string(),
            )
        })
}
