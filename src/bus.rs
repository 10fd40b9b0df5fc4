//! # System Bus
//!
//! The single point of contact between the CPU and everything else. Memory
//! accesses pass straight through to [`Memory`]; port I/O is routed to the
//! [`PortDevice`] bound to that port.
//!
//! ## Port Table
//!
//! - Each port has at most one device; binding is permanent.
//! - Binding an occupied port fails with [`BusError::DuplicatePort`].
//! - Accessing an unbound port fails with [`BusError::UnboundPort`] before any
//!   device is touched.
//!
//! The CPU is generic over [`SystemBus`], so tests and embedders can supply a
//! different backend.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::devices::{PortDevice, PortFn, SharedDevice};
use crate::memory::{Memory, MemoryError};

/// Errors raised by bus operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The port already has a device bound to it.
    #[error("duplicate-port: port 0x{0:04X} is already bound")]
    DuplicatePort(u16),

    /// Nothing is bound to the port.
    #[error("unbound-port: port 0x{0:04X} isn't bound")]
    UnboundPort(u16),

    /// The underlying memory access failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Interface the CPU uses for all memory and device access.
///
/// Addresses are absolute; offset-register arithmetic happens in the CPU.
pub trait SystemBus {
    fn mem_read8(&self, addr: u16) -> Result<u8, BusError>;

    fn mem_read16(&self, addr: u16) -> Result<u16, BusError>;

    fn mem_write8(&mut self, addr: u16, data: u8) -> Result<(), BusError>;

    fn mem_write16(&mut self, addr: u16, data: u16) -> Result<(), BusError>;

    /// Reads a value from the device bound to `port`.
    fn device_in(&mut self, port: u16) -> Result<u16, BusError>;

    /// Writes a value to the device bound to `port`.
    fn device_out(&mut self, port: u16, data: u16) -> Result<(), BusError>;
}

/// Memory plus port table.
///
/// # Examples
///
/// ```rust
/// use vm16::{Bus, BusError, Memory};
///
/// let mut bus = Bus::new(Memory::new());
/// bus.bind_fn(0x40, |_| 0x0007).unwrap();
///
/// assert_eq!(bus.device_in(0x40), Ok(0x0007));
/// assert_eq!(bus.bind_fn(0x40, |_| 0), Err(BusError::DuplicatePort(0x40)));
/// assert_eq!(bus.device_in(0x41), Err(BusError::UnboundPort(0x41)));
/// ```
pub struct Bus {
    memory: Memory,
    ports: HashMap<u16, SharedDevice>,
}

impl Bus {
    /// Creates a bus over `memory` with an empty port table.
    pub fn new(memory: Memory) -> Self {
        Self {
            memory,
            ports: HashMap::new(),
        }
    }

    /// Binds `device` to `port`.
    pub fn bind(&mut self, port: u16, device: SharedDevice) -> Result<(), BusError> {
        if self.ports.contains_key(&port) {
            return Err(BusError::DuplicatePort(port));
        }
        tracing::debug!("bus: bound port 0x{:04X}", port);
        self.ports.insert(port, device);
        Ok(())
    }

    /// Binds a plain `u16 -> u16` handler to `port`.
    ///
    /// On reads the handler receives [`PORT_SENTINEL`](crate::PORT_SENTINEL).
    pub fn bind_fn<F>(&mut self, port: u16, handler: F) -> Result<(), BusError>
    where
        F: FnMut(u16) -> u16 + 'static,
    {
        self.bind(port, Rc::new(RefCell::new(PortFn::new(handler))))
    }

    /// Binds one shared device to every port in `ports`.
    ///
    /// All ports are checked first, against the table and against each other,
    /// so a conflict leaves the table unchanged.
    pub fn attach<D>(&mut self, device: Rc<RefCell<D>>, ports: &[u16]) -> Result<(), BusError>
    where
        D: PortDevice + 'static,
    {
        for (i, &port) in ports.iter().enumerate() {
            if self.ports.contains_key(&port) || ports[..i].contains(&port) {
                return Err(BusError::DuplicatePort(port));
            }
        }
        for &port in ports {
            let shared: SharedDevice = device.clone();
            self.bind(port, shared)?;
        }
        Ok(())
    }

    /// True if a device is bound to `port`.
    pub fn is_bound(&self, port: u16) -> bool {
        self.ports.contains_key(&port)
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    fn device(&self, port: u16) -> Result<&SharedDevice, BusError> {
        self.ports.get(&port).ok_or(BusError::UnboundPort(port))
    }
}

impl SystemBus for Bus {
    fn mem_read8(&self, addr: u16) -> Result<u8, BusError> {
        Ok(self.memory.read8(addr))
    }

    fn mem_read16(&self, addr: u16) -> Result<u16, BusError> {
        Ok(self.memory.read16(addr)?)
    }

    fn mem_write8(&mut self, addr: u16, data: u8) -> Result<(), BusError> {
        self.memory.write8(addr, data);
        Ok(())
    }

    fn mem_write16(&mut self, addr: u16, data: u16) -> Result<(), BusError> {
        Ok(self.memory.write16(addr, data)?)
    }

    fn device_in(&mut self, port: u16) -> Result<u16, BusError> {
        let device = self.device(port)?;
        let value = device.borrow_mut().port_in(port);
        Ok(value)
    }

    fn device_out(&mut self, port: u16, data: u16) -> Result<(), BusError> {
        let device = self.device(port)?;
        device.borrow_mut().port_out(port, data);
        Ok(())
    }
}

impl Bus {
    /// Inherent forwarding so callers need not import [`SystemBus`].
    pub fn device_in(&mut self, port: u16) -> Result<u16, BusError> {
        SystemBus::device_in(self, port)
    }

    /// Inherent forwarding so callers need not import [`SystemBus`].
    pub fn device_out(&mut self, port: u16, data: u16) -> Result<(), BusError> {
        SystemBus::device_out(self, port, data)
    }
}
