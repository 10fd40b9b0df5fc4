//! # Instruction Implementations
//!
//! Each instruction family is a set of standalone functions taking the CPU and
//! the fetched instruction word. [`execute`] is the single dispatch point: an
//! exhaustive `match` over [`Opcode`], so adding an opcode to the catalogue
//! without a handler is a compile error.
//!
//! ## Categories
//!
//! - **alu**: ADD, SUB, MUL, DIV, INC, DEC, NEG, CMP, AND, OR, XOR, SHL, SHR, NOT
//! - **load_store**: MOV, LOAD, STOR, COPY and their byte forms
//! - **stack**: PUSH, PUSHI, POP, PUSHF, POPF
//! - **control**: WCYL, JMP, CALL, RET
//! - **branches**: conditional jumps and the LOP family
//! - **io**: IN, OUT
//! - **flags**: CLER, CLXP, STER, STXP, STRS, STSD

pub mod alu;
pub mod branches;
pub mod control;
pub mod flags;
pub mod io;
pub mod load_store;
pub mod stack;

use crate::bus::SystemBus;
use crate::cpu::{Cpu, ExecutionError};
use crate::encoding::InstructionWord;
use crate::opcodes::Opcode;
use crate::registers::Flags;

use load_store::Width;

/// Executes one decoded instruction. The program counter has already been
/// advanced past it.
pub(crate) fn execute<B: SystemBus>(
    cpu: &mut Cpu<B>,
    opcode: Opcode,
    word: InstructionWord,
) -> Result<(), ExecutionError> {
    match opcode {
        Opcode::Wcyl => control::execute_wcyl(cpu, word),

        Opcode::Add => alu::execute_binary(cpu, word, false, u16::wrapping_add),
        Opcode::Addi => alu::execute_binary(cpu, word, true, u16::wrapping_add),
        Opcode::Sub => alu::execute_binary(cpu, word, false, u16::wrapping_sub),
        Opcode::Subi => alu::execute_binary(cpu, word, true, u16::wrapping_sub),
        Opcode::Mul => alu::execute_binary(cpu, word, false, u16::wrapping_mul),
        Opcode::Muli => alu::execute_binary(cpu, word, true, u16::wrapping_mul),
        Opcode::Div => alu::execute_div(cpu, word, false),
        Opcode::Divi => alu::execute_div(cpu, word, true),
        Opcode::Inc => alu::execute_unary(cpu, word, |value| value.wrapping_add(1)),
        Opcode::Dec => alu::execute_unary(cpu, word, |value| value.wrapping_sub(1)),
        Opcode::Neg => alu::execute_unary(cpu, word, u16::wrapping_neg),
        Opcode::Cmp => alu::execute_compare(cpu, word, false),
        Opcode::Cmpi => alu::execute_compare(cpu, word, true),

        Opcode::And => alu::execute_binary(cpu, word, false, |a, b| a & b),
        Opcode::Andi => alu::execute_binary(cpu, word, true, |a, b| a & b),
        Opcode::Or => alu::execute_binary(cpu, word, false, |a, b| a | b),
        Opcode::Ori => alu::execute_binary(cpu, word, true, |a, b| a | b),
        Opcode::Xor => alu::execute_binary(cpu, word, false, |a, b| a ^ b),
        Opcode::Xori => alu::execute_binary(cpu, word, true, |a, b| a ^ b),
        Opcode::Shl => alu::execute_binary(cpu, word, false, alu::shift_left),
        Opcode::Shli => alu::execute_binary(cpu, word, true, alu::shift_left),
        Opcode::Shr => alu::execute_binary(cpu, word, false, alu::shift_right),
        Opcode::Shri => alu::execute_binary(cpu, word, true, alu::shift_right),
        Opcode::Not => alu::execute_unary(cpu, word, |value| !value),

        Opcode::Mov => load_store::execute_mov(cpu, word, false),
        Opcode::Movi => load_store::execute_mov(cpu, word, true),
        Opcode::Load => load_store::execute_load(cpu, word, false, Width::Word),
        Opcode::Loadi => load_store::execute_load(cpu, word, true, Width::Word),
        Opcode::Stor => load_store::execute_stor(cpu, word, false, Width::Word),
        Opcode::Stori => load_store::execute_stor(cpu, word, true, Width::Word),
        Opcode::Copy => load_store::execute_copy(cpu, word, false, Width::Word),
        Opcode::Copyi => load_store::execute_copy(cpu, word, true, Width::Word),
        Opcode::Loadb => load_store::execute_load(cpu, word, false, Width::Byte),
        Opcode::Loadbi => load_store::execute_load(cpu, word, true, Width::Byte),
        Opcode::Storb => load_store::execute_stor(cpu, word, false, Width::Byte),
        Opcode::Storbi => load_store::execute_stor(cpu, word, true, Width::Byte),
        Opcode::Copyb => load_store::execute_copy(cpu, word, false, Width::Byte),
        Opcode::Copybi => load_store::execute_copy(cpu, word, true, Width::Byte),

        Opcode::Push => stack::execute_push(cpu, word),
        Opcode::Pushi => stack::execute_pushi(cpu, word),
        Opcode::Pop => stack::execute_pop(cpu, word),
        Opcode::Pushf => stack::execute_pushf(cpu, word),
        Opcode::Popf => stack::execute_popf(cpu, word),
        Opcode::Call => control::execute_call(cpu, word),
        Opcode::Ret => control::execute_ret(cpu, word),

        Opcode::Jmp => control::execute_jmp(cpu, word),
        Opcode::Je => branches::branch_if(cpu, word, |f| f.contains(Flags::EQUAL)),
        Opcode::Jne => branches::branch_if(cpu, word, |f| !f.contains(Flags::EQUAL)),
        Opcode::Jg => branches::branch_if(cpu, word, |f| f.contains(Flags::GREATER)),
        Opcode::Jge => branches::branch_if(cpu, word, |f| {
            f.contains(Flags::GREATER) || f.contains(Flags::EQUAL)
        }),
        Opcode::Jl => branches::branch_if(cpu, word, |f| f.contains(Flags::LESSER)),
        Opcode::Jle => branches::branch_if(cpu, word, |f| {
            f.contains(Flags::LESSER) || f.contains(Flags::EQUAL)
        }),
        Opcode::Jer => branches::branch_if(cpu, word, |f| f.contains(Flags::ERROR)),
        Opcode::Jner => branches::branch_if(cpu, word, |f| !f.contains(Flags::ERROR)),
        Opcode::Jxp => branches::branch_if(cpu, word, |f| f.contains(Flags::EXCEPTION)),
        Opcode::Jnxp => branches::branch_if(cpu, word, |f| !f.contains(Flags::EXCEPTION)),
        Opcode::Lop => branches::execute_loop(cpu, word, |_| true),
        Opcode::Lope => branches::execute_loop(cpu, word, |f| f.contains(Flags::EQUAL)),
        Opcode::Lopne => branches::execute_loop(cpu, word, |f| !f.contains(Flags::EQUAL)),

        Opcode::In => io::execute_in(cpu, word),
        Opcode::Out => io::execute_out(cpu, word),

        Opcode::Cler => flags::execute_clear(cpu, Flags::ERROR),
        Opcode::Clxp => flags::execute_clear(cpu, Flags::EXCEPTION),
        Opcode::Ster => flags::execute_set(cpu, Flags::ERROR),
        Opcode::Stxp => flags::execute_set(cpu, Flags::EXCEPTION),
        Opcode::Strs => flags::execute_set(cpu, Flags::RESET),
        Opcode::Stsd => flags::execute_set(cpu, Flags::SHUTDOWN),
    }
}
