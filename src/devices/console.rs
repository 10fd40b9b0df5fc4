//! Serial console device.
//!
//! A byte-wide terminal link for hosts without a display: output bytes go to a
//! transmit callback, input bytes wait in a bounded FIFO until the program
//! reads them.

use std::collections::VecDeque;

use crate::devices::PortDevice;

/// OUT: transmit the low byte. IN: pop the next received byte, or 0.
pub const CONSOLE_DATA_PORT: u16 = 0x10;

/// IN: status bits, see [`STATUS_RX_READY`] and [`STATUS_OVERRUN`].
pub const CONSOLE_STATUS_PORT: u16 = 0x11;

/// At least one received byte is waiting.
pub const STATUS_RX_READY: u16 = 0x01;

/// A received byte was dropped because the FIFO was full. Cleared by reading
/// the status port.
pub const STATUS_OVERRUN: u16 = 0x02;

/// Receive FIFO capacity in bytes.
pub const RX_CAPACITY: usize = 256;

/// Serial console.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use vm16::devices::console::{ConsoleDevice, CONSOLE_DATA_PORT, CONSOLE_STATUS_PORT};
/// use vm16::PortDevice;
///
/// let sent = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&sent);
/// let mut console = ConsoleDevice::new();
/// console.set_transmit_callback(move |byte| sink.borrow_mut().push(byte));
///
/// console.port_out(CONSOLE_DATA_PORT, u16::from(b'H'));
/// assert_eq!(*sent.borrow(), b"H");
///
/// console.receive_byte(b'A');
/// assert_eq!(console.port_in(CONSOLE_STATUS_PORT) & 0x01, 0x01);
/// assert_eq!(console.port_in(CONSOLE_DATA_PORT), u16::from(b'A'));
/// ```
pub struct ConsoleDevice {
    rx_buffer: VecDeque<u8>,
    overrun: bool,
    on_transmit: Option<Box<dyn FnMut(u8)>>,
}

impl ConsoleDevice {
    /// Ports the console answers on, in order.
    pub const PORTS: [u16; 2] = [CONSOLE_DATA_PORT, CONSOLE_STATUS_PORT];

    pub fn new() -> Self {
        Self {
            rx_buffer: VecDeque::with_capacity(RX_CAPACITY),
            overrun: false,
            on_transmit: None,
        }
    }

    /// Sets the function called with every transmitted byte.
    pub fn set_transmit_callback<F>(&mut self, callback: F)
    where
        F: FnMut(u8) + 'static,
    {
        self.on_transmit = Some(Box::new(callback));
    }

    /// Queues a byte from the host side. Drops it and flags an overrun when
    /// the FIFO is full.
    pub fn receive_byte(&mut self, byte: u8) {
        if self.rx_buffer.len() < RX_CAPACITY {
            self.rx_buffer.push_back(byte);
        } else {
            tracing::warn!("console: receive buffer full, dropping 0x{:02X}", byte);
            self.overrun = true;
        }
    }

    pub fn rx_buffer_len(&self) -> usize {
        self.rx_buffer.len()
    }

    fn status(&mut self) -> u16 {
        let mut status = 0;
        if !self.rx_buffer.is_empty() {
            status |= STATUS_RX_READY;
        }
        if self.overrun {
            status |= STATUS_OVERRUN;
            self.overrun = false;
        }
        status
    }
}

impl Default for ConsoleDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PortDevice for ConsoleDevice {
    fn port_in(&mut self, port: u16) -> u16 {
        match port {
            CONSOLE_DATA_PORT => self.rx_buffer.pop_front().map_or(0, u16::from),
            CONSOLE_STATUS_PORT => self.status(),
            _ => 0,
        }
    }

    fn port_out(&mut self, port: u16, data: u16) {
        if port == CONSOLE_DATA_PORT {
            if let Some(callback) = self.on_transmit.as_mut() {
                callback(data as u8);
            }
        }
    }
}
