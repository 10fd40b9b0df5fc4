//! # ALU Instructions
//!
//! Arithmetic, bitwise, shift and compare operations. Every result is an
//! unsigned 16-bit value with wraparound; no flags are touched except by
//! CMP/CMPI and by DIV/DIVI on a zero divisor.

use crate::bus::SystemBus;
use crate::cpu::{Cpu, ExecutionError};
use crate::encoding::InstructionWord;
use crate::registers::{Flags, Register};

/// Executes a two-operand operation: `reg1 = op(reg1, source)`.
///
/// The source is the register in byte 2, or the 16-bit immediate when
/// `immediate` is set.
pub(crate) fn execute_binary<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    immediate: bool,
    op: impl Fn(u16, u16) -> u16,
) -> Result<(), ExecutionError> {
    let lhs = cpu.read_reg(word.reg1())?;
    let rhs = cpu.source_operand(word, immediate)?;
    cpu.write_reg(word.reg1(), op(lhs, rhs))
}

/// Executes a one-operand operation in place on `reg1`.
pub(crate) fn execute_unary<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    op: impl Fn(u16) -> u16,
) -> Result<(), ExecutionError> {
    let value = cpu.read_reg(word.reg1())?;
    cpu.write_reg(word.reg1(), op(value))
}

/// Executes DIV/DIVI: quotient to GZ, remainder to HZ.
///
/// A zero divisor sets EXCEPTION and leaves GZ and HZ unchanged.
pub(crate) fn execute_div<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    immediate: bool,
) -> Result<(), ExecutionError> {
    let dividend = cpu.read_reg(word.reg1())?;
    let divisor = cpu.source_operand(word, immediate)?;

    if divisor == 0 {
        tracing::debug!("division by zero at 0x{:04X}", cpu.current);
        cpu.flags.insert(Flags::EXCEPTION);
        return Ok(());
    }

    cpu.set_reg(Register::Gz, dividend / divisor);
    cpu.set_reg(Register::Hz, dividend % divisor);
    Ok(())
}

/// Executes CMP/CMPI. Only EQUAL, GREATER and LESSER change.
pub(crate) fn execute_compare<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    immediate: bool,
) -> Result<(), ExecutionError> {
    let lhs = cpu.read_reg(word.reg1())?;
    let rhs = cpu.source_operand(word, immediate)?;
    cpu.set_compare_flags(lhs, rhs);
    Ok(())
}

/// Logical shift left; counts of 16 or more shift every bit out.
pub(crate) fn shift_left(value: u16, count: u16) -> u16 {
    value.checked_shl(count as u32).unwrap_or(0)
}

/// Logical shift right; counts of 16 or more shift every bit out.
pub(crate) fn shift_right(value: u16, count: u16) -> u16 {
    value.checked_shr(count as u32).unwrap_or(0)
}
