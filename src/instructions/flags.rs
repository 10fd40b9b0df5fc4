//! # Flag Control Instructions
//!
//! CLER/CLXP clear ERROR/EXCEPTION. STER/STXP set them. STRS and STSD raise
//! RESET and SHUTDOWN, which the step loop acts on.

use crate::bus::SystemBus;
use crate::cpu::{Cpu, ExecutionError};
use crate::registers::Flags;

pub(crate) fn execute_clear<B: SystemBus>(
    cpu: &mut Cpu<B>,
    flag: Flags,
) -> Result<(), ExecutionError> {
    cpu.flags.remove(flag);
    Ok(())
}

pub(crate) fn execute_set<B: SystemBus>(
    cpu: &mut Cpu<B>,
    flag: Flags,
) -> Result<(), ExecutionError> {
    cpu.flags.insert(flag);
    Ok(())
}
