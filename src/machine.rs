//! # Machine
//!
//! Top-level system that wires [`Memory`], [`Bus`] and [`Cpu`] together with
//! the standard devices, and drives execution in fixed-size ticks.
//!
//! A machine boots either from a flat image loaded at address 0, or from the
//! first sector of a disk image. In the second case the disk stays attached
//! so the boot code can load the rest of the program itself.
//!
//! ```
//! use vm16::{Machine, Register};
//!
//! // MOVI AZ, 5 / ADDI AZ, 3 / STSD
//! let image = [
//!     0x21, 0x01, 0x05, 0x00,
//!     0x02, 0x01, 0x03, 0x00,
//!     0x58, 0x00, 0x00, 0x00,
//! ];
//! let mut machine = Machine::from_image(&image).unwrap();
//! machine.run_tick(1_000).unwrap();
//!
//! assert!(machine.is_halted());
//! assert_eq!(machine.cpu().reg(Register::Az), 8);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::io::{Read, Seek, Write};
use std::rc::Rc;

use thiserror::Error;

use crate::bus::{Bus, BusError};
use crate::cpu::{Cpu, ExecutionError};
use crate::devices::disk::{DiskDevice, DiskError};
use crate::devices::{ClockDevice, ConsoleDevice, PortDevice};
use crate::memory::{Memory, MemoryError};
use crate::registers::{Flags, REGISTERS};

/// Ticks per second when pacing against wall-clock time.
pub const TICK_RATE: u32 = 60;

/// Errors while building a machine.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Disk(#[from] DiskError),
}

/// Instructions to run per tick for a target frequency in Hz.
///
/// Never zero, so a tick always makes progress.
pub fn steps_per_tick(frequency: u32) -> u64 {
    u64::from((frequency / TICK_RATE).max(1))
}

/// A complete VM: CPU, memory and bound devices.
pub struct Machine {
    cpu: Cpu<Bus>,
}

impl Machine {
    /// Empty memory, no devices.
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(Bus::new(Memory::new())),
        }
    }

    /// Loads `image` at address 0 and attaches the system clock.
    pub fn from_image(image: &[u8]) -> Result<Self, MachineError> {
        let mut machine = Self {
            cpu: Cpu::new(Bus::new(Memory::with_image(0, image)?)),
        };
        machine.attach_clock(ClockDevice::new())?;
        tracing::debug!("machine: loaded {} byte image", image.len());
        Ok(machine)
    }

    /// Loads sector 0 of `disk` at address 0, then attaches the disk and the
    /// system clock.
    pub fn from_disk<S>(mut disk: DiskDevice<S>) -> Result<Self, MachineError>
    where
        S: Read + Write + Seek + 'static,
    {
        let boot = disk.read_sector(0)?;
        let mut machine = Self::from_image(&boot)?;
        machine.attach_disk(disk)?;
        Ok(machine)
    }

    pub fn attach_clock(&mut self, clock: ClockDevice) -> Result<(), BusError> {
        self.attach(Rc::new(RefCell::new(clock)), &ClockDevice::PORTS)
    }

    pub fn attach_disk<S>(&mut self, disk: DiskDevice<S>) -> Result<(), BusError>
    where
        S: Read + Write + Seek + 'static,
    {
        self.attach(Rc::new(RefCell::new(disk)), &DiskDevice::<S>::PORTS)
    }

    /// Attaches `console` and hands back a shared handle for feeding input.
    pub fn attach_console(
        &mut self,
        console: ConsoleDevice,
    ) -> Result<Rc<RefCell<ConsoleDevice>>, BusError> {
        let console = Rc::new(RefCell::new(console));
        self.attach(Rc::clone(&console), &ConsoleDevice::PORTS)?;
        Ok(console)
    }

    /// Binds a device to every port in `ports`.
    pub fn attach<D>(&mut self, device: Rc<RefCell<D>>, ports: &[u16]) -> Result<(), BusError>
    where
        D: PortDevice + 'static,
    {
        self.cpu.bus_mut().attach(device, ports)
    }

    pub fn step(&mut self) -> Result<(), ExecutionError> {
        self.cpu.step()
    }

    /// Runs one tick of at most `steps` instructions.
    ///
    /// Returns the number of instructions retired.
    pub fn run_tick(&mut self, steps: u64) -> Result<u64, ExecutionError> {
        self.cpu.run_for_steps(steps)
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// True if execution stopped on an unhandled arithmetic fault.
    pub fn faulted(&self) -> bool {
        self.cpu.flags().contains(Flags::EXCEPTION)
    }

    pub fn cpu(&self) -> &Cpu<Bus> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu<Bus> {
        &mut self.cpu
    }

    /// The full 64 KiB address space.
    pub fn memory_dump(&self) -> &[u8] {
        self.cpu.bus().memory().as_slice()
    }

    /// Registers and flags, one `NAME 0xVALUE` pair per line.
    pub fn register_report(&self) -> RegisterReport<'_> {
        RegisterReport { cpu: &self.cpu }
    }
}

/// Printable snapshot of the CPU state, see [`Machine::register_report`].
pub struct RegisterReport<'a> {
    cpu: &'a Cpu<Bus>,
}

impl fmt::Display for RegisterReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for reg in REGISTERS {
            writeln!(f, "{:<2} 0x{:04X}", reg.name(), self.cpu.reg(reg))?;
        }
        writeln!(f, "FLAGS {}", self.cpu.flags())?;
        writeln!(f, "STEPS {}", self.cpu.steps())
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
