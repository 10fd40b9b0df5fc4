//! # Stack Instructions
//!
//! The stack grows upward from SB. PUSH writes at `SB + SP` and then adds 2
//! to SP; POP subtracts 2 and then reads. MO is not applied.

use crate::bus::SystemBus;
use crate::cpu::{Cpu, ExecutionError};
use crate::encoding::InstructionWord;
use crate::registers::Flags;

pub(crate) fn execute_push<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
) -> Result<(), ExecutionError> {
    let value = cpu.read_reg(word.reg1())?;
    cpu.push(value)
}

pub(crate) fn execute_pushi<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
) -> Result<(), ExecutionError> {
    cpu.push(word.immediate())
}

pub(crate) fn execute_pop<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
) -> Result<(), ExecutionError> {
    // Validate the destination before moving SP
    cpu.read_reg(word.reg1())?;
    let value = cpu.pop()?;
    cpu.write_reg(word.reg1(), value)
}

pub(crate) fn execute_pushf<B: SystemBus>(
    cpu: &mut Cpu<B>,
    _word: InstructionWord,
) -> Result<(), ExecutionError> {
    cpu.push(cpu.flags.bits())
}

/// Undefined bits in the popped value are dropped.
pub(crate) fn execute_popf<B: SystemBus>(
    cpu: &mut Cpu<B>,
    _word: InstructionWord,
) -> Result<(), ExecutionError> {
    let bits = cpu.pop()?;
    cpu.flags = Flags::from_bits_truncate(bits);
    Ok(())
}
