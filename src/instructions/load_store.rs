//! # Data Movement Instructions
//!
//! - MOV/MOVI: register ← register or immediate
//! - LOAD/LOADI: register ← memory at register-held or immediate address
//! - STOR/STORI: memory at register-held address ← register or immediate
//! - COPY/COPYI: memory at register-held address ← memory at register-held
//!   or immediate address
//!
//! B-suffixed forms move a single byte: loads zero-extend, stores keep the
//! low byte. All addresses are relative to MO.

use crate::bus::SystemBus;
use crate::cpu::{Cpu, ExecutionError};
use crate::encoding::InstructionWord;

/// Access width of a memory instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Width {
    Byte,
    Word,
}

fn read<B: SystemBus>(cpu: &Cpu<B>, addr: u16, width: Width) -> Result<u16, ExecutionError> {
    match width {
        Width::Byte => cpu.read_mem8(addr).map(u16::from),
        Width::Word => cpu.read_mem16(addr),
    }
}

fn write<B: SystemBus>(
    cpu: &mut Cpu<B>,
    addr: u16,
    value: u16,
    width: Width,
) -> Result<(), ExecutionError> {
    match width {
        Width::Byte => cpu.write_mem8(addr, value as u8),
        Width::Word => cpu.write_mem16(addr, value),
    }
}

pub(crate) fn execute_mov<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    immediate: bool,
) -> Result<(), ExecutionError> {
    let value = cpu.source_operand(word, immediate)?;
    cpu.write_reg(word.reg1(), value)
}

pub(crate) fn execute_load<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    immediate: bool,
    width: Width,
) -> Result<(), ExecutionError> {
    let addr = cpu.source_operand(word, immediate)?;
    let value = read(cpu, addr, width)?;
    cpu.write_reg(word.reg1(), value)
}

pub(crate) fn execute_stor<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    immediate: bool,
    width: Width,
) -> Result<(), ExecutionError> {
    let addr = cpu.read_reg(word.reg1())?;
    let value = cpu.source_operand(word, immediate)?;
    write(cpu, addr, value, width)
}

pub(crate) fn execute_copy<B: SystemBus>(
    cpu: &mut Cpu<B>,
    word: InstructionWord,
    immediate: bool,
    width: Width,
) -> Result<(), ExecutionError> {
    let dest = cpu.read_reg(word.reg1())?;
    let src = cpu.source_operand(word, immediate)?;
    let value = read(cpu, src, width)?;
    write(cpu, dest, value, width)
}
