//! # Sector Disk Device
//!
//! A block device over any `Read + Write + Seek` store whose size is a whole
//! number of 512-byte sectors. Transfers go through a one-sector buffer that
//! the guest fills or drains a byte at a time.
//!
//! ## Ports
//!
//! | Port | Direction | Function |
//! |------|-----------|----------|
//! | 0x61 | OUT | select mode: 0 = read, 1 = write |
//! | 0x62 | OUT | select sector (LBA); IN returns the current LBA |
//! | 0x63 | IN/OUT | transfer one sector between store and buffer |
//! | 0x64 | IN (read mode) / OUT (write mode) | next buffer byte |
//! | 0x65 | IN | number of sectors in the store |
//! | 0x66 | IN | 1 once all 512 buffer bytes have been transferred |
//!
//! Selecting a mode or a sector clears the buffer and rewinds its index.
//! Successive transfers without reselecting move on to the following sector.
//!
//! ## Reading a sector
//!
//! ```text
//! MOVI AZ, 0
//! OUT  AZ, 0x61   ; read mode
//! MOVI AZ, 2
//! OUT  AZ, 0x62   ; sector 2
//! OUT  AZ, 0x63   ; fill the buffer
//! IN   BZ, 0x64   ; first byte
//! ```
//!
//! Store failures are logged and otherwise ignored; the guest sees zeros.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use thiserror::Error;

use crate::devices::{PortDevice, PORT_SENTINEL};

/// Bytes per sector.
pub const SECTOR_SIZE: usize = 512;

pub const DISK_MODE_PORT: u16 = 0x61;
pub const DISK_LBA_PORT: u16 = 0x62;
pub const DISK_TRANSFER_PORT: u16 = 0x63;
pub const DISK_DATA_PORT: u16 = 0x64;
pub const DISK_COUNT_PORT: u16 = 0x65;
pub const DISK_END_PORT: u16 = 0x66;

/// Errors opening a disk image.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("disk I/O: {0}")]
    Io(#[from] io::Error),

    /// The store is not a whole number of sectors.
    #[error("incomplete sectors: {size} bytes is not a multiple of {SECTOR_SIZE}")]
    Misaligned { size: u64 },
}

/// Transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskMode {
    Read,
    Write,
}

/// Sector-addressed disk.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use vm16::devices::disk::{DiskDevice, DISK_COUNT_PORT};
/// use vm16::PortDevice;
///
/// let mut disk = DiskDevice::new(Cursor::new(vec![0u8; 1024])).unwrap();
/// assert_eq!(disk.port_in(DISK_COUNT_PORT), 2);
///
/// assert!(DiskDevice::new(Cursor::new(vec![0u8; 100])).is_err());
/// ```
pub struct DiskDevice<S> {
    store: S,
    size: u64,
    mode: DiskMode,
    lba: u16,
    position: u64,
    buffer: [u8; SECTOR_SIZE],
    index: usize,
}

impl DiskDevice<File> {
    /// Opens a disk image file for reading and writing.
    pub fn open(path: &Path) -> Result<Self, DiskError> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::new(file)
    }
}

impl<S: Read + Write + Seek> DiskDevice<S> {
    /// Ports the disk answers on, in order.
    pub const PORTS: [u16; 6] = [
        DISK_MODE_PORT,
        DISK_LBA_PORT,
        DISK_TRANSFER_PORT,
        DISK_DATA_PORT,
        DISK_COUNT_PORT,
        DISK_END_PORT,
    ];

    /// Wraps `store`, which must hold a whole number of sectors.
    pub fn new(mut store: S) -> Result<Self, DiskError> {
        let size = store.seek(SeekFrom::End(0))?;
        if size % SECTOR_SIZE as u64 != 0 {
            return Err(DiskError::Misaligned { size });
        }
        store.seek(SeekFrom::Start(0))?;

        Ok(Self {
            store,
            size,
            mode: DiskMode::Read,
            lba: 0,
            position: 0,
            buffer: [0; SECTOR_SIZE],
            index: 0,
        })
    }

    /// Number of sectors, saturating at `u16::MAX`.
    pub fn sector_count(&self) -> u16 {
        u16::try_from(self.size / SECTOR_SIZE as u64).unwrap_or(u16::MAX)
    }

    pub fn mode(&self) -> DiskMode {
        self.mode
    }

    /// The backing store.
    pub fn get_ref(&self) -> &S {
        &self.store
    }

    /// Reads sector `lba` directly, bypassing the port protocol.
    pub fn read_sector(&mut self, lba: u16) -> Result<[u8; SECTOR_SIZE], DiskError> {
        let mut sector = [0; SECTOR_SIZE];
        self.store.seek(SeekFrom::Start(lba as u64 * SECTOR_SIZE as u64))?;
        self.store.read_exact(&mut sector)?;
        Ok(sector)
    }

    fn reset_buffer(&mut self) {
        self.buffer = [0; SECTOR_SIZE];
        self.index = 0;
    }

    fn set_mode(&mut self, data: u16) {
        self.reset_buffer();
        self.mode = match data {
            0 => DiskMode::Read,
            1 => DiskMode::Write,
            other => {
                tracing::warn!("disk: unknown mode {}, keeping {:?}", other, self.mode);
                self.mode
            }
        };
    }

    fn set_lba(&mut self, lba: u16) {
        self.reset_buffer();
        self.lba = lba;
        self.position = lba as u64 * SECTOR_SIZE as u64;
    }

    fn transfer(&mut self) {
        let result = match self.mode {
            DiskMode::Read => self.read_into_buffer(),
            DiskMode::Write => self.write_from_buffer(),
        };
        match result {
            Ok(()) => {
                tracing::debug!("disk: {:?} sector at byte {}", self.mode, self.position);
                self.position += SECTOR_SIZE as u64;
            }
            Err(err) => {
                tracing::warn!("disk: {:?} at byte {} failed: {}", self.mode, self.position, err);
            }
        }
    }

    fn read_into_buffer(&mut self) -> io::Result<()> {
        self.store.seek(SeekFrom::Start(self.position))?;
        if let Err(err) = self.store.read_exact(&mut self.buffer) {
            self.buffer = [0; SECTOR_SIZE];
            return Err(err);
        }
        Ok(())
    }

    fn write_from_buffer(&mut self) -> io::Result<()> {
        if self.position + SECTOR_SIZE as u64 > self.size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "write past the last sector",
            ));
        }
        self.store.seek(SeekFrom::Start(self.position))?;
        self.store.write_all(&self.buffer)?;
        self.store.flush()
    }

    fn read_byte(&mut self) -> u16 {
        if self.mode != DiskMode::Read || self.index == SECTOR_SIZE {
            return 0;
        }
        let byte = self.buffer[self.index];
        self.index += 1;
        byte as u16
    }

    fn write_byte(&mut self, data: u16) {
        if self.mode != DiskMode::Write || self.index == SECTOR_SIZE {
            return;
        }
        self.buffer[self.index] = data as u8;
        self.index += 1;
    }
}

impl<S: Read + Write + Seek> PortDevice for DiskDevice<S> {
    fn port_in(&mut self, port: u16) -> u16 {
        match port {
            DISK_LBA_PORT => self.lba,
            DISK_TRANSFER_PORT => {
                self.transfer();
                PORT_SENTINEL
            }
            DISK_DATA_PORT => self.read_byte(),
            DISK_COUNT_PORT => self.sector_count(),
            DISK_END_PORT => u16::from(self.index == SECTOR_SIZE),
            _ => PORT_SENTINEL,
        }
    }

    fn port_out(&mut self, port: u16, data: u16) {
        match port {
            DISK_MODE_PORT => self.set_mode(data),
            DISK_LBA_PORT => self.set_lba(data),
            DISK_TRANSFER_PORT => self.transfer(),
            DISK_DATA_PORT => self.write_byte(data),
            _ => {}
        }
    }
}
