//! Port I/O: `IN r, port` and `OUT r, port`.

use crate::bus::SystemBus;
use crate::cpu::{Cpu, ExecutionError};
use crate::encoding::InstructionWord;

pub(crate) fn execute_in<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
) -> Result<(), ExecutionError> {
    // Reject a bad destination before the device sees the read
    cpu.read_reg(word.reg1())?;
    let value = cpu.bus.device_in(word.immediate())?;
    cpu.write_reg(word.reg1(), value)
}

pub(crate) fn execute_out<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
) -> Result<(), ExecutionError> {
    let value = cpu.read_reg(word.reg1())?;
    cpu.bus.device_out(word.immediate(), value)?;
    Ok(())
}
