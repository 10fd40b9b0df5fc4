//! Assembly source parser
//!
//! Turns a [`RawLine`] into a typed [`Statement`]: the command is resolved to
//! an opcode or directive, the argument count is checked against the
//! addressing mode, and every argument is converted to a register, a literal
//! or a label reference.

use crate::addressing::AddressingMode;
use crate::assembler::lexer::{self, RawLine};
use crate::assembler::{validate_label, AssemblerError, ErrorType};
use crate::opcodes::Opcode;
use crate::registers::Register;

/// Assembler directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `LOCATE name`: define a label at the current offset
    Locate,
    /// `STR /text/`: raw ASCII bytes
    Str,
    I8,
    U8,
    I16,
    U16,
}

impl Directive {
    pub const ALL: [Directive; 6] = [
        Directive::Locate,
        Directive::Str,
        Directive::I8,
        Directive::U8,
        Directive::I16,
        Directive::U16,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Directive::Locate => "LOCATE",
            Directive::Str => "STR",
            Directive::I8 => "I8",
            Directive::U8 => "U8",
            Directive::I16 => "I16",
            Directive::U16 => "U16",
        }
    }

    /// Looks up a directive by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Directive> {
        Directive::ALL
            .into_iter()
            .find(|directive| directive.name().eq_ignore_ascii_case(name))
    }

    /// Inclusive value range and byte width of an integer-list directive.
    fn int_format(self) -> Option<(i64, i64, usize)> {
        match self {
            Directive::I8 => Some((i8::MIN as i64, i8::MAX as i64, 1)),
            Directive::U8 => Some((0, u8::MAX as i64, 1)),
            Directive::I16 => Some((i16::MIN as i64, i16::MAX as i64, 2)),
            Directive::U16 => Some((0, u16::MAX as i64, 2)),
            Directive::Locate | Directive::Str => None,
        }
    }
}

/// A 16-bit operand that is either known now or patched by the linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Literal(u16),
    Label(String),
}

/// Operands of an instruction, shaped by its addressing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
    None,
    Reg(Register),
    RegReg(Register, Register),
    RegImm(Register, Value),
    Imm(Value),
}

/// What a source line asks the assembler to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Define a label at the current offset
    Locate(String),

    /// Emit one instruction word
    Instruction { opcode: Opcode, operands: Operands },

    /// Emit raw bytes
    Data(Vec<u8>),
}

/// A parsed line of assembly source
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyLine {
    /// Line number in source file (1-indexed)
    pub line_number: usize,

    pub statement: Statement,
}

/// Why a string is not a usable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberError {
    /// Not in any literal syntax; may still be a label
    NotANumber,
    /// Literal syntax, but too large to represent
    Overflow,
}

/// Parse an integer literal.
///
/// Accepted forms: `0x` hex, `0b` binary, decimal with optional leading `+`
/// or `-`. Range checks against a target width happen at the call site.
///
/// ```
/// use vm16::assembler::parser::{parse_number, NumberError};
///
/// assert_eq!(parse_number("0x1F"), Ok(31));
/// assert_eq!(parse_number("0b101"), Ok(5));
/// assert_eq!(parse_number("-12"), Ok(-12));
/// assert_eq!(parse_number("loop"), Err(NumberError::NotANumber));
/// ```
pub fn parse_number(s: &str) -> Result<i64, NumberError> {
    fn digits(text: &str, radix: u32) -> Result<i64, NumberError> {
        if text.is_empty() || !text.chars().all(|c| c.is_digit(radix)) {
            return Err(NumberError::NotANumber);
        }
        i64::from_str_radix(text, radix).map_err(|_| NumberError::Overflow)
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        digits(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        digits(bin, 2)
    } else if let Some(magnitude) = s.strip_prefix('-') {
        digits(magnitude, 10).map(|value| -value)
    } else if let Some(magnitude) = s.strip_prefix('+') {
        digits(magnitude, 10)
    } else {
        digits(s, 10)
    }
}

/// Parses one source line. Blank and comment-only lines yield `Ok(None)`.
pub fn parse_line(line_number: usize, text: &str) -> Result<Option<AssemblyLine>, AssemblerError> {
    let Some(raw) = lexer::split_line(text) else {
        return Ok(None);
    };

    let statement = if let Some(opcode) = Opcode::from_mnemonic(raw.command) {
        parse_instruction(line_number, opcode, raw)?
    } else if let Some(directive) = Directive::from_name(raw.command) {
        parse_directive(line_number, directive, raw)?
    } else {
        return Err(AssemblerError::new(
            ErrorType::InvalidMnemonic,
            line_number,
            format!("invalid directive/instruction {}", raw.command.to_ascii_uppercase()),
        ));
    };

    Ok(Some(AssemblyLine {
        line_number,
        statement,
    }))
}

fn check_arity(
    line_number: usize,
    command: &str,
    args: &[&str],
    expected: usize,
) -> Result<(), AssemblerError> {
    if args.len() != expected {
        return Err(AssemblerError::new(
            ErrorType::ArgumentCount,
            line_number,
            format!(
                "invalid argument count for {}: expected {}, found {}",
                command.to_ascii_uppercase(),
                expected,
                args.len()
            ),
        ));
    }
    Ok(())
}

fn parse_register(line_number: usize, arg: &str) -> Result<Register, AssemblerError> {
    Register::from_name(arg).ok_or_else(|| {
        AssemblerError::new(
            ErrorType::InvalidRegister,
            line_number,
            format!("invalid register {}", arg.to_ascii_uppercase()),
        )
    })
}

/// An immediate is a literal in 0..=65535 or, failing number syntax, a label.
fn parse_value(line_number: usize, arg: &str) -> Result<Value, AssemblerError> {
    match parse_number(arg) {
        Ok(value) => u16::try_from(value).map(Value::Literal).map_err(|_| {
            AssemblerError::new(
                ErrorType::RangeError,
                line_number,
                format!("immediate {} out of range 0..=65535", arg),
            )
        }),
        Err(NumberError::Overflow) => Err(AssemblerError::new(
            ErrorType::RangeError,
            line_number,
            format!("immediate {} out of range 0..=65535", arg),
        )),
        Err(NumberError::NotANumber) => {
            validate_label(line_number, arg)?;
            Ok(Value::Label(arg.to_string()))
        }
    }
}

fn parse_instruction(
    line_number: usize,
    opcode: Opcode,
    raw: RawLine<'_>,
) -> Result<Statement, AssemblerError> {
    let args = lexer::split_arguments(raw.rest);
    let mode = opcode.addressing_mode();
    check_arity(line_number, raw.command, &args, mode.arity())?;

    let operands = match mode {
        AddressingMode::None => Operands::None,
        AddressingMode::Reg => Operands::Reg(parse_register(line_number, args[0])?),
        AddressingMode::RegReg => Operands::RegReg(
            parse_register(line_number, args[0])?,
            parse_register(line_number, args[1])?,
        ),
        AddressingMode::RegImm => Operands::RegImm(
            parse_register(line_number, args[0])?,
            parse_value(line_number, args[1])?,
        ),
        AddressingMode::Imm => Operands::Imm(parse_value(line_number, args[0])?),
    };

    Ok(Statement::Instruction { opcode, operands })
}

fn parse_directive(
    line_number: usize,
    directive: Directive,
    raw: RawLine<'_>,
) -> Result<Statement, AssemblerError> {
    match directive {
        Directive::Locate => {
            let args = lexer::split_arguments(raw.rest);
            check_arity(line_number, raw.command, &args, 1)?;
            validate_label(line_number, args[0])?;
            Ok(Statement::Locate(args[0].to_string()))
        }
        Directive::Str => {
            let text = lexer::string_literal(raw.rest).ok_or_else(|| {
                AssemblerError::new(
                    ErrorType::MalformedString,
                    line_number,
                    "STR expects text between two / delimiters".to_string(),
                )
            })?;
            if text.is_empty() || !text.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
                return Err(AssemblerError::new(
                    ErrorType::MalformedString,
                    line_number,
                    format!("unsupported characters in /{}/", text),
                ));
            }
            Ok(Statement::Data(text.as_bytes().to_vec()))
        }
        Directive::I8 | Directive::U8 | Directive::I16 | Directive::U16 => {
            let args = lexer::split_arguments(raw.rest);
            if args.is_empty() {
                return Err(AssemblerError::new(
                    ErrorType::ArgumentCount,
                    line_number,
                    format!("{} expects at least one value", directive.name()),
                ));
            }
            let mut bytes = Vec::new();
            for arg in args {
                bytes.extend(parse_data_value(line_number, directive, arg)?);
            }
            Ok(Statement::Data(bytes))
        }
    }
}

/// Parses one entry of an integer list into its little-endian bytes.
fn parse_data_value(
    line_number: usize,
    directive: Directive,
    arg: &str,
) -> Result<Vec<u8>, AssemblerError> {
    let Some((min, max, width)) = directive.int_format() else {
        return Ok(Vec::new());
    };

    let value = match parse_number(arg) {
        Ok(value) if (min..=max).contains(&value) => value,
        Ok(_) | Err(NumberError::Overflow) => {
            return Err(AssemblerError::new(
                ErrorType::RangeError,
                line_number,
                format!("{} out of range for {} ({}..={})", arg, directive.name(), min, max),
            ))
        }
        Err(NumberError::NotANumber) => {
            return Err(AssemblerError::new(
                ErrorType::SyntaxError,
                line_number,
                format!("{} is not an integer literal", arg),
            ))
        }
    };

    // Two's complement truncation to the directive width
    let bytes = (value as u16).to_le_bytes();
    Ok(bytes[..width].to_vec())
}
