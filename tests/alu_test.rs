//! Tests for the arithmetic, bitwise and shift instructions.
//!
//! Tests cover:
//! - Register-register and register-immediate forms
//! - 16-bit wraparound
//! - DIV quotient/remainder registers and the divide-by-zero policy
//! - Shift counts of 16 and above
//! - No flags changed by plain arithmetic

use vm16::{Bus, Cpu, Flags, InstructionWord, Memory, Opcode, Register};

/// Helper: word with a register and a 16-bit immediate
fn ri(opcode: Opcode, reg: Register, imm: u16) -> InstructionWord {
    InstructionWord::new(opcode.code(), reg.index(), imm)
}

/// Helper: word with two registers
fn rr(opcode: Opcode, a: Register, b: Register) -> InstructionWord {
    InstructionWord::new(opcode.code(), a.index(), b.index() as u16)
}

/// Helper: word with a single register
fn r(opcode: Opcode, reg: Register) -> InstructionWord {
    InstructionWord::new(opcode.code(), reg.index(), 0)
}

/// Helper function to create a CPU with `program` loaded at 0x0000
fn setup_cpu(program: &[InstructionWord]) -> Cpu {
    let image: Vec<u8> = program.iter().flat_map(|word| word.to_bytes()).collect();
    Cpu::new(Bus::new(Memory::with_image(0, &image).unwrap()))
}

// ========== ADD / SUB / MUL ==========

#[test]
fn test_add_registers() {
    let mut cpu = setup_cpu(&[rr(Opcode::Add, Register::Az, Register::Bz)]);
    cpu.set_reg(Register::Az, 0x1234);
    cpu.set_reg(Register::Bz, 0x0101);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Az), 0x1335);
    assert_eq!(cpu.reg(Register::Bz), 0x0101);
    assert_eq!(cpu.pc(), 4);
}

#[test]
fn test_add_wraps() {
    let mut cpu = setup_cpu(&[ri(Opcode::Addi, Register::Az, 2)]);
    cpu.set_reg(Register::Az, 0xFFFF);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Az), 0x0001);
    assert_eq!(cpu.flags(), Flags::empty());
}

#[test]
fn test_sub_wraps_below_zero() {
    let mut cpu = setup_cpu(&[ri(Opcode::Subi, Register::Cz, 1)]);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Cz), 0xFFFF);
}

#[test]
fn test_sub_registers() {
    let mut cpu = setup_cpu(&[rr(Opcode::Sub, Register::Dz, Register::Ez)]);
    cpu.set_reg(Register::Dz, 100);
    cpu.set_reg(Register::Ez, 58);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Dz), 42);
}

#[test]
fn test_mul_keeps_low_16_bits() {
    let mut cpu = setup_cpu(&[
        ri(Opcode::Muli, Register::Az, 0x0100),
        rr(Opcode::Mul, Register::Bz, Register::Bz),
    ]);
    cpu.set_reg(Register::Az, 0x0100);
    cpu.set_reg(Register::Bz, 300);

    cpu.run_for_steps(2).unwrap();

    assert_eq!(cpu.reg(Register::Az), 0x0000);
    assert_eq!(cpu.reg(Register::Bz), (300u32 * 300 % 65536) as u16);
}

// ========== DIV ==========

#[test]
fn test_div_writes_quotient_and_remainder() {
    let mut cpu = setup_cpu(&[rr(Opcode::Div, Register::Az, Register::Bz)]);
    cpu.set_reg(Register::Az, 17);
    cpu.set_reg(Register::Bz, 5);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Gz), 3);
    assert_eq!(cpu.reg(Register::Hz), 2);
    // The dividend register is not overwritten
    assert_eq!(cpu.reg(Register::Az), 17);
}

#[test]
fn test_divi() {
    let mut cpu = setup_cpu(&[ri(Opcode::Divi, Register::Cz, 10)]);
    cpu.set_reg(Register::Cz, 65535);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Gz), 6553);
    assert_eq!(cpu.reg(Register::Hz), 5);
}

#[test]
fn test_div_by_zero_sets_exception_and_continues() {
    let mut cpu = setup_cpu(&[
        ri(Opcode::Divi, Register::Az, 0),
        ri(Opcode::Movi, Register::Bz, 9),
    ]);
    cpu.set_reg(Register::Az, 10);
    cpu.set_reg(Register::Gz, 0x1111);
    cpu.set_reg(Register::Hz, 0x2222);

    cpu.step().unwrap();

    assert!(cpu.flags().contains(Flags::EXCEPTION));
    assert_eq!(cpu.reg(Register::Gz), 0x1111);
    assert_eq!(cpu.reg(Register::Hz), 0x2222);

    // Execution carries on with the next instruction
    cpu.step().unwrap();
    assert_eq!(cpu.reg(Register::Bz), 9);
}

// ========== INC / DEC / NEG / NOT ==========

#[test]
fn test_unary_operations() {
    let mut cpu = setup_cpu(&[
        r(Opcode::Inc, Register::Az),
        r(Opcode::Dec, Register::Bz),
        r(Opcode::Neg, Register::Cz),
        r(Opcode::Not, Register::Dz),
    ]);
    cpu.set_reg(Register::Az, 0xFFFF);
    cpu.set_reg(Register::Bz, 0x0000);
    cpu.set_reg(Register::Cz, 0x0001);
    cpu.set_reg(Register::Dz, 0x00FF);

    cpu.run_for_steps(4).unwrap();

    assert_eq!(cpu.reg(Register::Az), 0x0000);
    assert_eq!(cpu.reg(Register::Bz), 0xFFFF);
    assert_eq!(cpu.reg(Register::Cz), 0xFFFF);
    assert_eq!(cpu.reg(Register::Dz), 0xFF00);
    assert_eq!(cpu.flags(), Flags::empty());
}

// ========== Bitwise ==========

#[test]
fn test_bitwise_immediates() {
    let mut cpu = setup_cpu(&[
        ri(Opcode::Andi, Register::Az, 0x0FF0),
        ri(Opcode::Ori, Register::Bz, 0x8001),
        ri(Opcode::Xori, Register::Cz, 0xFFFF),
    ]);
    cpu.set_reg(Register::Az, 0x1234);
    cpu.set_reg(Register::Bz, 0x0100);
    cpu.set_reg(Register::Cz, 0x5555);

    cpu.run_for_steps(3).unwrap();

    assert_eq!(cpu.reg(Register::Az), 0x0230);
    assert_eq!(cpu.reg(Register::Bz), 0x8101);
    assert_eq!(cpu.reg(Register::Cz), 0xAAAA);
}

#[test]
fn test_bitwise_registers() {
    let mut cpu = setup_cpu(&[
        rr(Opcode::And, Register::Az, Register::Dz),
        rr(Opcode::Or, Register::Bz, Register::Dz),
        rr(Opcode::Xor, Register::Cz, Register::Dz),
    ]);
    cpu.set_reg(Register::Az, 0b1100);
    cpu.set_reg(Register::Bz, 0b1100);
    cpu.set_reg(Register::Cz, 0b1100);
    cpu.set_reg(Register::Dz, 0b1010);

    cpu.run_for_steps(3).unwrap();

    assert_eq!(cpu.reg(Register::Az), 0b1000);
    assert_eq!(cpu.reg(Register::Bz), 0b1110);
    assert_eq!(cpu.reg(Register::Cz), 0b0110);
}

#[test]
fn test_xor_self_clears() {
    let mut cpu = setup_cpu(&[rr(Opcode::Xor, Register::Ez, Register::Ez)]);
    cpu.set_reg(Register::Ez, 0xBEEF);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Ez), 0);
}

// ========== Shifts ==========

#[test]
fn test_shift_immediate() {
    let mut cpu = setup_cpu(&[
        ri(Opcode::Shli, Register::Az, 4),
        ri(Opcode::Shri, Register::Bz, 4),
    ]);
    cpu.set_reg(Register::Az, 0x0F0F);
    cpu.set_reg(Register::Bz, 0xF0F0);

    cpu.run_for_steps(2).unwrap();

    assert_eq!(cpu.reg(Register::Az), 0xF0F0);
    assert_eq!(cpu.reg(Register::Bz), 0x0F0F);
}

#[test]
fn test_shift_right_is_logical() {
    let mut cpu = setup_cpu(&[ri(Opcode::Shri, Register::Az, 1)]);
    cpu.set_reg(Register::Az, 0x8000);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Az), 0x4000);
}

#[test]
fn test_shift_by_register_count_of_16_or_more_clears() {
    let mut cpu = setup_cpu(&[
        rr(Opcode::Shl, Register::Az, Register::Cz),
        rr(Opcode::Shr, Register::Bz, Register::Dz),
    ]);
    cpu.set_reg(Register::Az, 0xFFFF);
    cpu.set_reg(Register::Bz, 0xFFFF);
    cpu.set_reg(Register::Cz, 16);
    cpu.set_reg(Register::Dz, 0x1234);

    cpu.run_for_steps(2).unwrap();

    assert_eq!(cpu.reg(Register::Az), 0);
    assert_eq!(cpu.reg(Register::Bz), 0);
    assert_eq!(cpu.flags(), Flags::empty());
}

#[test]
fn test_shift_by_zero_is_identity() {
    let mut cpu = setup_cpu(&[ri(Opcode::Shli, Register::Az, 0)]);
    cpu.set_reg(Register::Az, 0xABCD);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Az), 0xABCD);
}

// ========== Flags Preservation ==========

#[test]
fn test_arithmetic_preserves_flags() {
    let mut cpu = setup_cpu(&[
        ri(Opcode::Addi, Register::Az, 1),
        ri(Opcode::Muli, Register::Az, 3),
    ]);
    cpu.set_flags(Flags::ERROR | Flags::LESSER);

    cpu.run_for_steps(2).unwrap();

    assert_eq!(cpu.flags(), Flags::ERROR | Flags::LESSER);
}
