//! # Control Flow Instructions
//!
//! WCYL, JMP, CALL and RET. Targets are absolute values for XA; since the
//! fetch already advanced XA, a taken jump simply overwrites it.
//!
//! CALL pushes MO then XA and jumps; RET pops XA then MO.

use crate::bus::SystemBus;
use crate::cpu::{Cpu, ExecutionError};
use crate::encoding::InstructionWord;
use crate::registers::Register;

/// Waits one cycle.
pub(crate) fn execute_wcyl<B: SystemBus>(
    _cpu: &mut Cpu<B>,
    _word: InstructionWord,
) -> Result<(), ExecutionError> {
    Ok(())
}

pub(crate) fn execute_jmp<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
) -> Result<(), ExecutionError> {
    cpu.set_pc(word.immediate());
    Ok(())
}

pub(crate) fn execute_call<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
) -> Result<(), ExecutionError> {
    cpu.push(cpu.reg(Register::Mo))?;
    cpu.push(cpu.pc())?;
    cpu.set_pc(word.immediate());
    Ok(())
}

pub(crate) fn execute_ret<B: SystemBus>(
    cpu: &mut Cpu<B>,
    _word: InstructionWord,
) -> Result<(), ExecutionError> {
    let return_address = cpu.pop()?;
    let offset = cpu.pop()?;
    cpu.set_pc(return_address);
    cpu.set_reg(Register::Mo, offset);
    Ok(())
}
