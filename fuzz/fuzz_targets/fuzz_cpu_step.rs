//! Fuzz target for CPU step execution.
//!
//! Builds an arbitrary register file, flags and program, then runs a bounded
//! number of steps. Errors are expected; panics are bugs.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vm16::{Bus, Cpu, Flags, Memory, REGISTERS};

/// Arbitrary CPU initial state
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    /// Values for AZ..MO, in register order
    registers: [u16; 12],
    /// Raw flag bits; undefined bits are dropped
    flags: u16,
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    /// Loaded at address 0
    program: Vec<u8>,
    /// Step budget, kept small
    steps: u8,
}

fuzz_target!(|input: FuzzInput| {
    let program = &input.program[..input.program.len().min(0x10000)];
    let Ok(memory) = Memory::with_image(0, program) else {
        return;
    };

    let mut bus = Bus::new(memory);
    // One echo port so IN/OUT have somewhere to go
    let _ = bus.bind_fn(0x0001, |data| data);

    let mut cpu = Cpu::new(bus);
    for (reg, value) in REGISTERS.iter().zip(input.cpu_state.registers) {
        cpu.set_reg(*reg, value);
    }
    cpu.set_flags(Flags::from_bits_truncate(input.cpu_state.flags));

    let before = cpu.steps();
    let _ = cpu.run_for_steps(input.steps as u64);

    // Invariants that hold whatever the program did
    assert!(cpu.steps() - before <= input.steps as u64);
    assert_eq!(cpu.registers()[0], 0);
    assert_eq!(cpu.flags().bits() & !0x7F, 0);
});
