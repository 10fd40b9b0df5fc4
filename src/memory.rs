//! # Flat Memory
//!
//! A fixed 64 KiB byte array with bounds-checked 8/16-bit access and bulk
//! load. Addresses reaching this module are already absolute: the CPU adds
//! the memory-offset register before handing an address to the bus.
//!
//! 16-bit values are little-endian. A 16-bit access at `0xFFFF` would read
//! past the end of the array and is rejected with
//! [`MemoryError::OutOfBounds`] rather than wrapping.

use thiserror::Error;

/// Size of the address space in bytes.
pub const MEMORY_SIZE: usize = 0x10000;

/// Error returned by bounds-checked memory access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The access would touch bytes beyond the end of memory.
    #[error("out-of-bounds memory access: {len} byte(s) at 0x{addr:04X}")]
    OutOfBounds {
        /// First absolute address of the access
        addr: usize,
        /// Number of bytes requested
        len: usize,
    },
}

/// 64 KiB flat memory.
///
/// # Examples
///
/// ```
/// use vm16::Memory;
///
/// let mut mem = Memory::new();
/// mem.write16(0x1000, 0xBEEF).unwrap();
/// assert_eq!(mem.read8(0x1000), 0xEF);
/// assert_eq!(mem.read8(0x1001), 0xBE);
/// assert_eq!(mem.read16(0x1000).unwrap(), 0xBEEF);
///
/// // The last byte has no successor for a 16-bit read
/// assert!(mem.read16(0xFFFF).is_err());
/// ```
pub struct Memory {
    data: Box<[u8; MEMORY_SIZE]>,
}

impl Memory {
    /// Creates zero-filled memory.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; MEMORY_SIZE]),
        }
    }

    /// Creates memory with `image` loaded at `offset`.
    pub fn with_image(offset: u16, image: &[u8]) -> Result<Self, MemoryError> {
        let mut memory = Self::new();
        memory.load(offset, image)?;
        Ok(memory)
    }

    /// Reads one byte. Every 16-bit address is in range.
    pub fn read8(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    /// Writes one byte.
    pub fn write8(&mut self, addr: u16, value: u8) {
        self.data[addr as usize] = value;
    }

    /// Reads a little-endian 16-bit value.
    pub fn read16(&self, addr: u16) -> Result<u16, MemoryError> {
        let start = Self::check(addr as usize, 2)?;
        Ok(u16::from_le_bytes([self.data[start], self.data[start + 1]]))
    }

    /// Writes a little-endian 16-bit value.
    pub fn write16(&mut self, addr: u16, value: u16) -> Result<(), MemoryError> {
        let start = Self::check(addr as usize, 2)?;
        self.data[start..start + 2].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Copies `bytes` into memory starting at `offset`.
    ///
    /// Fails without modifying memory if the image does not fit.
    pub fn load(&mut self, offset: u16, bytes: &[u8]) -> Result<(), MemoryError> {
        let start = Self::check(offset as usize, bytes.len())?;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// The whole address space, e.g. for dumping.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }

    fn check(addr: usize, len: usize) -> Result<usize, MemoryError> {
        if addr + len > MEMORY_SIZE {
            return Err(MemoryError::OutOfBounds { addr, len });
        }
        Ok(addr)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();

        // Initially all zeros
        assert_eq!(mem.read8(0x0000), 0x00);
        assert_eq!(mem.read8(0xFFFF), 0x00);

        mem.write8(0x1234, 0x42);
        assert_eq!(mem.read8(0x1234), 0x42);
        assert_eq!(mem.read8(0x1233), 0x00);
        assert_eq!(mem.read8(0x1235), 0x00);
    }

    #[test]
    fn test_memory_16bit_boundaries() {
        let mut mem = Memory::new();

        mem.write16(0xFFFE, 0xABCD).unwrap();
        assert_eq!(mem.read16(0xFFFE).unwrap(), 0xABCD);

        assert_eq!(
            mem.write16(0xFFFF, 0x1234),
            Err(MemoryError::OutOfBounds {
                addr: 0xFFFF,
                len: 2
            })
        );
        // Failed write leaves the last byte untouched
        assert_eq!(mem.read8(0xFFFF), 0xAB);
    }

    #[test]
    fn test_memory_load() {
        let mut mem = Memory::new();
        mem.load(0x0100, &[1, 2, 3]).unwrap();
        assert_eq!(mem.read8(0x0100), 1);
        assert_eq!(mem.read8(0x0102), 3);

        // Exactly fills to the end
        assert!(mem.load(0xFFFE, &[9, 9]).is_ok());
        // One byte too many
        assert!(mem.load(0xFFFE, &[9, 9, 9]).is_err());
    }
}
