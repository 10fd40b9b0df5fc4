//! # vm16: a 16-bit Port-Mapped Virtual Machine
//!
//! An interpreter for a small 16-bit register machine, together with the
//! toolchain that produces programs for it: a line-oriented assembler, an
//! object format and a linker.
//!
//! ## Quick Start
//!
//! ```rust
//! use vm16::{assembler, linker, Bus, Cpu, Memory, Register};
//!
//! let source = "\
//!     MOVI AZ, 5
//!     CALL add_three
//!     STSD
//! LOCATE add_three
//!     ADDI AZ, 3
//!     RET
//! ";
//!
//! let object = assembler::assemble(source).unwrap();
//! let image = linker::link(&[object]).unwrap();
//!
//! let mut cpu = Cpu::new(Bus::new(Memory::with_image(0, &image.bytecode).unwrap()));
//! cpu.set_reg(Register::Sb, 0x8000);
//! cpu.run_for_steps(100).unwrap();
//!
//! assert!(cpu.is_halted());
//! assert_eq!(cpu.reg(Register::Az), 8);
//! ```
//!
//! ## Architecture
//!
//! - **Fixed-width instructions**: every instruction is one 4-byte word,
//!   `[opcode, reg1, reg2 | imm_lo, imm_hi]`
//! - **Single register file**: twelve named 16-bit registers in one array,
//!   including the program counter (XA) and a memory-offset register (MO)
//!   that relocates every data access
//! - **Port-mapped I/O**: devices implement [`PortDevice`] and are bound to
//!   port numbers on the [`Bus`]; the CPU reaches them with `IN` and `OUT`
//! - **Table-driven opcodes**: one catalogue in [`opcodes`] drives decoding,
//!   assembly and disassembly
//!
//! ## Modules
//!
//! - `cpu` - register file, flags and the step loop
//! - `bus` - memory and port routing
//! - `memory` - 64 KiB flat memory
//! - `opcodes`, `addressing`, `encoding`, `registers` - the instruction set
//! - `assembler`, `object`, `linker` - the toolchain
//! - `disassembler` - instruction words back to text
//! - `devices` - the port device contract plus clock, console and disk devices
//! - `machine` - a ready-to-run system with devices attached

pub mod addressing;
pub mod assembler;
pub mod bus;
pub mod cpu;
pub mod devices;
pub mod disassembler;
pub mod encoding;
pub mod linker;
pub mod machine;
pub mod memory;
pub mod object;
pub mod opcodes;
pub mod registers;

// Internal instruction implementations (not part of public API)
mod instructions;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use addressing::AddressingMode;
pub use bus::{Bus, BusError, SystemBus};
pub use cpu::{Cpu, ExecutionError};
pub use devices::{ClockDevice, ConsoleDevice, DiskDevice, PortDevice, PortFn, SharedDevice, PORT_SENTINEL};
pub use encoding::{InstructionWord, IMMEDIATE_OFFSET, INSTRUCTION_SIZE};
pub use linker::LinkError;
pub use machine::{Machine, MachineError};
pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use object::{ObjectError, ObjectFile};
pub use opcodes::{Opcode, OpcodeMetadata, OPCODE_TABLE};
pub use registers::{Flags, Register, REGISTERS, REGISTER_COUNT};
