//! # CPU State and Execution
//!
//! This module contains the [`Cpu`] struct holding the register file and
//! flags, and the fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! - **Register file**: one `[u16; 13]` array indexed by the register byte of
//!   the instruction word. Slot 0 is reserved: it reads as zero and writes to
//!   it are discarded. Named access goes through [`Register`], whose
//!   discriminants are the array indices.
//! - **Flags**: a [`Flags`] bit set.
//! - **Step counter**: number of instructions retired since construction.
//!
//! ## Execution Model
//!
//! - [`Cpu::step`]: execute one instruction. A halted CPU (SHUTDOWN set)
//!   returns `Ok(())` without doing anything.
//! - [`Cpu::run_for_steps`]: execute up to a step budget, stopping early once
//!   halted.
//!
//! Every data address an instruction issues has the memory-offset register
//! (MO) added before it reaches the bus, and so does instruction fetch. Stack
//! accesses use `SB + SP` directly. All address arithmetic wraps at 16 bits.

use thiserror::Error;

use crate::bus::{Bus, BusError, SystemBus};
use crate::disassembler;
use crate::encoding::{InstructionWord, INSTRUCTION_SIZE};
use crate::instructions;
use crate::opcodes::Opcode;
use crate::registers::{Flags, Register, REGISTER_COUNT};

/// Errors that stop the interpreter.
///
/// `address` is the program-counter value of the faulting instruction, before
/// the fetch advanced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The opcode byte has no entry in the opcode catalogue.
    #[error("illegal-instruction: opcode 0x{opcode:02X} at 0x{address:04X}")]
    IllegalInstruction { opcode: u8, address: u16 },

    /// A register operand names a slot outside the register file.
    #[error("illegal-register: index {index} at 0x{address:04X}")]
    IllegalRegister { index: u8, address: u16 },

    /// A memory or port access failed.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// CPU state and execution context.
///
/// The CPU owns its bus. It is generic over the [`SystemBus`] trait so tests
/// can substitute their own backend; the default is [`Bus`].
///
/// # Examples
///
/// ```
/// use vm16::{Bus, Cpu, Flags, Memory, Register};
///
/// // MOVI AZ, 5 / ADDI AZ, 3 / STSD
/// let image = [
///     0x21, 0x01, 0x05, 0x00,
///     0x02, 0x01, 0x03, 0x00,
///     0x58, 0x00, 0x00, 0x00,
/// ];
/// let memory = Memory::with_image(0, &image).unwrap();
/// let mut cpu = Cpu::new(Bus::new(memory));
///
/// let retired = cpu.run_for_steps(10).unwrap();
/// assert_eq!(retired, 3);
/// assert_eq!(cpu.reg(Register::Az), 8);
/// assert!(cpu.is_halted());
/// assert!(cpu.flags().contains(Flags::SHUTDOWN));
/// ```
pub struct Cpu<B: SystemBus = Bus> {
    /// Register file, indexed by register byte
    pub(crate) regs: [u16; REGISTER_COUNT],

    /// Status flags
    pub(crate) flags: Flags,

    /// Retired instruction count
    pub(crate) steps: u64,

    /// Program counter of the instruction being executed
    pub(crate) current: u16,

    pub(crate) bus: B,
}

impl<B: SystemBus> Cpu<B> {
    /// Creates a CPU with every register and flag zeroed.
    ///
    /// The program counter therefore starts at the boot address 0x0000.
    pub fn new(bus: B) -> Self {
        Self {
            regs: [0; REGISTER_COUNT],
            flags: Flags::empty(),
            steps: 0,
            current: 0,
            bus,
        }
    }

    /// Executes a single instruction.
    ///
    /// 1. Does nothing if the CPU is halted
    /// 2. Fetches two 16-bit words at `MO + XA`
    /// 3. Advances XA by 4
    /// 4. Decodes and executes the instruction
    /// 5. Reboots if the instruction set RESET
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::IllegalInstruction`] for an unassigned opcode byte
    /// - [`ExecutionError::IllegalRegister`] for a register index above 12
    /// - [`ExecutionError::Bus`] for an unbound port or an out-of-bounds access
    ///
    /// # Examples
    ///
    /// ```
    /// use vm16::{Bus, Cpu, ExecutionError, Memory};
    ///
    /// let memory = Memory::with_image(0, &[0xFF, 0, 0, 0]).unwrap();
    /// let mut cpu = Cpu::new(Bus::new(memory));
    ///
    /// assert_eq!(
    ///     cpu.step(),
    ///     Err(ExecutionError::IllegalInstruction { opcode: 0xFF, address: 0 })
    /// );
    /// ```
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        if self.is_halted() {
            return Ok(());
        }

        let pc = self.pc();
        self.current = pc;

        let low = self.read_mem16(pc)?;
        let high = self.read_mem16(pc.wrapping_add(2))?;
        let word = InstructionWord::from_halves(low, high);
        self.set_pc(pc.wrapping_add(INSTRUCTION_SIZE as u16));

        let opcode_byte = word.opcode_byte();
        let opcode = Opcode::from_byte(opcode_byte).ok_or(ExecutionError::IllegalInstruction {
            opcode: opcode_byte,
            address: pc,
        })?;

        tracing::trace!("{:04X}: {}", pc, disassembler::format_word(word));

        instructions::execute(self, opcode, word)?;
        self.steps += 1;

        if self.flags.contains(Flags::RESET) {
            tracing::debug!("reset requested at 0x{:04X}, rebooting", pc);
            self.reboot();
        }

        Ok(())
    }

    /// Executes instructions until `max_steps` have retired or the CPU halts.
    ///
    /// Returns the number of instructions actually retired.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first [`ExecutionError`].
    pub fn run_for_steps(&mut self, max_steps: u64) -> Result<u64, ExecutionError> {
        let start = self.steps;
        while self.steps - start < max_steps && !self.is_halted() {
            self.step()?;
        }
        Ok(self.steps - start)
    }

    /// Zeroes every register and flag. Memory is left untouched.
    pub fn reboot(&mut self) {
        self.regs = [0; REGISTER_COUNT];
        self.flags = Flags::empty();
    }

    /// True once SHUTDOWN is set.
    pub fn is_halted(&self) -> bool {
        self.flags.contains(Flags::SHUTDOWN)
    }

    // ========== Register Getters ==========

    /// Value of a named register.
    pub fn reg(&self, reg: Register) -> u16 {
        self.regs[reg.index() as usize]
    }

    /// Sets a named register.
    pub fn set_reg(&mut self, reg: Register, value: u16) {
        self.regs[reg.index() as usize] = value;
    }

    /// The whole register file, slot 0 included.
    pub fn registers(&self) -> &[u16; REGISTER_COUNT] {
        &self.regs
    }

    /// Program counter (XA).
    pub fn pc(&self) -> u16 {
        self.reg(Register::Xa)
    }

    pub fn set_pc(&mut self, value: u16) {
        self.set_reg(Register::Xa, value);
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    /// Instructions retired since construction. Reboots do not reset it.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    // ========== Execution Helpers ==========

    /// Reads a register by instruction-word index.
    pub(crate) fn read_reg(&self, index: u8) -> Result<u16, ExecutionError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(ExecutionError::IllegalRegister {
                index,
                address: self.current,
            })
    }

    /// Writes a register by instruction-word index. Writes to slot 0 vanish.
    pub(crate) fn write_reg(&mut self, index: u8, value: u16) -> Result<(), ExecutionError> {
        if index as usize >= REGISTER_COUNT {
            return Err(ExecutionError::IllegalRegister {
                index,
                address: self.current,
            });
        }
        if index != 0 {
            self.regs[index as usize] = value;
        }
        Ok(())
    }

    /// Second operand: the register named by byte 2, or the immediate.
    pub(crate) fn source_operand(
        &self,
        word: InstructionWord,
        immediate: bool,
    ) -> Result<u16, ExecutionError> {
        if immediate {
            Ok(word.immediate())
        } else {
            self.read_reg(word.reg2())
        }
    }

    fn absolute(&self, addr: u16) -> u16 {
        addr.wrapping_add(self.reg(Register::Mo))
    }

    pub(crate) fn read_mem8(&self, addr: u16) -> Result<u8, ExecutionError> {
        Ok(self.bus.mem_read8(self.absolute(addr))?)
    }

    pub(crate) fn read_mem16(&self, addr: u16) -> Result<u16, ExecutionError> {
        Ok(self.bus.mem_read16(self.absolute(addr))?)
    }

    pub(crate) fn write_mem8(&mut self, addr: u16, value: u8) -> Result<(), ExecutionError> {
        let addr = self.absolute(addr);
        Ok(self.bus.mem_write8(addr, value)?)
    }

    pub(crate) fn write_mem16(&mut self, addr: u16, value: u16) -> Result<(), ExecutionError> {
        let addr = self.absolute(addr);
        Ok(self.bus.mem_write16(addr, value)?)
    }

    fn stack_top(&self) -> u16 {
        self.reg(Register::Sb).wrapping_add(self.reg(Register::Sp))
    }

    /// Writes at `SB + SP`, then advances SP by 2.
    pub(crate) fn push(&mut self, value: u16) -> Result<(), ExecutionError> {
        let addr = self.stack_top();
        self.bus.mem_write16(addr, value)?;
        let sp = self.reg(Register::Sp).wrapping_add(2);
        self.set_reg(Register::Sp, sp);
        Ok(())
    }

    /// Retreats SP by 2, then reads at `SB + SP`.
    pub(crate) fn pop(&mut self) -> Result<u16, ExecutionError> {
        let sp = self.reg(Register::Sp).wrapping_sub(2);
        self.set_reg(Register::Sp, sp);
        Ok(self.bus.mem_read16(self.stack_top())?)
    }

    /// Sets exactly one of EQUAL, GREATER, LESSER from an unsigned compare.
    pub(crate) fn set_compare_flags(&mut self, lhs: u16, rhs: u16) {
        self.flags.set(Flags::EQUAL, lhs == rhs);
        self.flags.set(Flags::GREATER, lhs > rhs);
        self.flags.set(Flags::LESSER, lhs < rhs);
    }
}
