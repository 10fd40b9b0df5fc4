//! # Register File Layout and Flags
//!
//! Registers live in one ordered array indexed by the register byte of the
//! instruction word. [`Register`] names those indices, so named and indexed
//! access always refer to the same slot.
//!
//! | Index | Name | Role |
//! |-------|------|------|
//! | 0     | -    | reserved, reads as zero |
//! | 1-8   | AZ-HZ | general purpose (GZ/HZ receive DIV results, HZ counts loops) |
//! | 9     | SP   | stack pointer |
//! | 10    | SB   | stack base |
//! | 11    | XA   | execution address (program counter) |
//! | 12    | MO   | memory offset added to every data address |

use std::fmt;

/// Number of slots in the register file, including the reserved slot 0.
pub const REGISTER_COUNT: usize = 13;

/// A named register slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    Az = 1,
    Bz = 2,
    Cz = 3,
    Dz = 4,
    Ez = 5,
    Fz = 6,
    Gz = 7,
    Hz = 8,
    Sp = 9,
    Sb = 10,
    Xa = 11,
    Mo = 12,
}

/// Every assembler-visible register, in index order.
pub const REGISTERS: [Register; REGISTER_COUNT - 1] = [
    Register::Az,
    Register::Bz,
    Register::Cz,
    Register::Dz,
    Register::Ez,
    Register::Fz,
    Register::Gz,
    Register::Hz,
    Register::Sp,
    Register::Sb,
    Register::Xa,
    Register::Mo,
];

impl Register {
    /// Slot index in the register file.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Upper-case assembler name.
    pub fn name(self) -> &'static str {
        match self {
            Register::Az => "AZ",
            Register::Bz => "BZ",
            Register::Cz => "CZ",
            Register::Dz => "DZ",
            Register::Ez => "EZ",
            Register::Fz => "FZ",
            Register::Gz => "GZ",
            Register::Hz => "HZ",
            Register::Sp => "SP",
            Register::Sb => "SB",
            Register::Xa => "XA",
            Register::Mo => "MO",
        }
    }

    /// Named register at `index`. The reserved slot 0 has no name.
    pub fn from_index(index: u8) -> Option<Register> {
        REGISTERS.get((index as usize).checked_sub(1)?).copied()
    }

    /// Looks up a register by name, ignoring ASCII case.
    ///
    /// ```
    /// use vm16::Register;
    ///
    /// assert_eq!(Register::from_name("az"), Some(Register::Az));
    /// assert_eq!(Register::from_name("Mo"), Some(Register::Mo));
    /// assert_eq!(Register::from_name("IZ"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Register> {
        REGISTERS
            .iter()
            .copied()
            .find(|reg| reg.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Processor status flags.
    ///
    /// EQUAL, GREATER and LESSER are written together by compares. ERROR and
    /// EXCEPTION stay set until cleared by an instruction. RESET and SHUTDOWN
    /// are consumed by the step loop.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Flags: u16 {
        const ERROR = 1 << 0;
        const EXCEPTION = 1 << 1;
        const EQUAL = 1 << 2;
        const GREATER = 1 << 3;
        const LESSER = 1 << 4;
        const RESET = 1 << 5;
        const SHUTDOWN = 1 << 6;
    }
}

/// Set flags by name, `|`-separated, or `-` when none are set.
impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
