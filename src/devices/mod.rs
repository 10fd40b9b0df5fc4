//! Port-mapped device support.
//!
//! Devices never see the bus or the CPU. They implement [`PortDevice`] and are
//! bound to one or more 16-bit port numbers on a [`Bus`](crate::Bus). A device
//! that uses several ports (select, then transfer) is bound once per port and
//! shared between the bindings.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use vm16::{Bus, Memory, PortDevice};
//!
//! struct Latch {
//!     value: u16,
//! }
//!
//! impl PortDevice for Latch {
//!     fn port_in(&mut self, _port: u16) -> u16 {
//!         self.value
//!     }
//!
//!     fn port_out(&mut self, _port: u16, data: u16) {
//!         self.value = data;
//!     }
//! }
//!
//! let mut bus = Bus::new(Memory::new());
//! bus.attach(Rc::new(RefCell::new(Latch { value: 0 })), &[0x10]).unwrap();
//!
//! bus.device_out(0x10, 0x1234).unwrap();
//! assert_eq!(bus.device_in(0x10).unwrap(), 0x1234);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

pub mod clock;
pub mod console;
pub mod disk;

pub use clock::ClockDevice;
pub use console::ConsoleDevice;
pub use disk::DiskDevice;

/// Value handed to a function-style handler when the CPU reads a port.
pub const PORT_SENTINEL: u16 = 0xFFFF;

/// Capability interface for anything reachable through IN/OUT.
///
/// Both operations are synchronous and infallible from the CPU's point of
/// view: a device that hits an internal failure reports it through its own
/// channel (logging, status port) and returns a value anyway.
pub trait PortDevice {
    /// Produces the value read by `IN` from `port`.
    fn port_in(&mut self, port: u16) -> u16;

    /// Consumes the value written by `OUT` to `port`.
    fn port_out(&mut self, port: u16, data: u16);
}

/// A device shared between several port bindings.
pub type SharedDevice = Rc<RefCell<dyn PortDevice>>;

/// Adapts a `u16 -> u16` handler to [`PortDevice`].
///
/// Reads call the handler with [`PORT_SENTINEL`] and return its result;
/// writes call it with the data and discard the result.
///
/// ```rust
/// use vm16::{PortDevice, PortFn, PORT_SENTINEL};
///
/// let mut echo = PortFn::new(|data| data);
/// assert_eq!(echo.port_in(0x01), PORT_SENTINEL);
/// ```
pub struct PortFn<F> {
    handler: F,
}

impl<F: FnMut(u16) -> u16> PortFn<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F: FnMut(u16) -> u16> PortDevice for PortFn<F> {
    fn port_in(&mut self, _port: u16) -> u16 {
        (self.handler)(PORT_SENTINEL)
    }

    fn port_out(&mut self, _port: u16, data: u16) {
        (self.handler)(data);
    }
}
