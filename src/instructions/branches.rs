//! # Conditional Branches
//!
//! The J* family branches on flag bits. LOP, LOPE and LOPNE always decrement
//! HZ first and branch only if the new value is nonzero and the gate holds.

use crate::bus::SystemBus;
use crate::cpu::{Cpu, ExecutionError};
use crate::encoding::InstructionWord;
use crate::registers::{Flags, Register};

/// Jumps to the immediate target if `condition` holds for the current flags.
pub(crate) fn branch_if<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    condition: impl Fn(Flags) -> bool,
) -> Result<(), ExecutionError> {
    if condition(cpu.flags) {
        cpu.set_pc(word.immediate());
    }
    Ok(())
}

pub(crate) fn execute_loop<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    gate: impl Fn(Flags) -> bool,
) -> Result<(), ExecutionError> {
    let counter = cpu.reg(Register::Hz).wrapping_sub(1);
    cpu.set_reg(Register::Hz, counter);
    if counter != 0 && gate(cpu.flags) {
        cpu.set_pc(word.immediate());
    }
    Ok(())
}
