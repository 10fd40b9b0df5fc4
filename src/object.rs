//! # Object Files
//!
//! The unit passed from the assembler to the linker: bytecode plus two tables.
//!
//! - **address table**: label name → byte offset of its definition
//! - **reference table**: byte offset of a referencing instruction → label name.
//!   The 16-bit field to patch sits at
//!   [`IMMEDIATE_OFFSET`](crate::encoding::IMMEDIATE_OFFSET) past the key.
//!
//! Offsets are relative to the start of the object until it is linked.
//!
//! ## On-disk layout
//!
//! An object is stored as three files sharing a prefix:
//!
//! | File | Content |
//! |------|---------|
//! | `<prefix>.code` | raw bytecode |
//! | `<prefix>.addr` | repeated `name \0 offset_lo offset_hi` |
//! | `<prefix>.ref`  | repeated `offset_lo offset_hi name \0` |
//!
//! Tables are written in sorted order so the output is reproducible.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors reading or writing object files.
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table entry stops before its terminator or offset.
    #[error("truncated {table} table entry at byte {offset}")]
    Truncated { table: &'static str, offset: usize },

    /// A label name is not valid UTF-8.
    #[error("invalid label name in {table} table at byte {offset}")]
    InvalidName { table: &'static str, offset: usize },

    /// The address table defines the same label twice.
    #[error("label `{name}` defined twice in address table (second at byte {offset})")]
    DuplicateName { name: String, offset: usize },

    /// The reference table lists the same instruction offset twice.
    #[error("offset 0x{key:04X} listed twice in reference table (second at byte {offset})")]
    DuplicateReference { key: u16, offset: usize },
}

/// Assembled (or linked) bytecode with its label tables.
///
/// # Examples
///
/// ```
/// use vm16::ObjectFile;
///
/// let mut object = ObjectFile::new();
/// object.bytecode = vec![0x40, 0x00, 0x00, 0x00];
/// object.addresses.insert("start".to_string(), 0);
/// object.references.insert(0, "start".to_string());
///
/// let addr = object.encode_addresses();
/// assert_eq!(addr, b"start\0\x00\x00");
///
/// let decoded = ObjectFile::from_parts(
///     object.bytecode.clone(),
///     &addr,
///     &object.encode_references(),
/// ).unwrap();
/// assert_eq!(decoded, object);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectFile {
    /// Instruction words and data, verbatim
    pub bytecode: Vec<u8>,

    /// Label name → offset
    pub addresses: BTreeMap<String, u16>,

    /// Instruction offset → label name to patch in
    pub references: BTreeMap<u16, String>,
}

impl ObjectFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an object from bytecode and encoded tables.
    pub fn from_parts(bytecode: Vec<u8>, addresses: &[u8], references: &[u8]) -> Result<Self, ObjectError> {
        Ok(Self {
            bytecode,
            addresses: decode_addresses(addresses)?,
            references: decode_references(references)?,
        })
    }

    /// Encodes the address table: `name \0 offset(LE)` per entry.
    pub fn encode_addresses(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, offset) in &self.addresses {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out
    }

    /// Encodes the reference table: `offset(LE) name \0` per entry.
    pub fn encode_references(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (offset, name) in &self.references {
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
        out
    }

    /// Writes `<prefix>.code`, `<prefix>.addr` and `<prefix>.ref`.
    pub fn write(&self, prefix: &Path) -> Result<(), ObjectError> {
        write_file(&part_path(prefix, "code"), &self.bytecode)?;
        write_file(&part_path(prefix, "addr"), &self.encode_addresses())?;
        write_file(&part_path(prefix, "ref"), &self.encode_references())?;
        tracing::debug!(
            "wrote object {} ({} bytes, {} labels, {} references)",
            prefix.display(),
            self.bytecode.len(),
            self.addresses.len(),
            self.references.len()
        );
        Ok(())
    }

    /// Reads an object written by [`ObjectFile::write`].
    pub fn read(prefix: &Path) -> Result<Self, ObjectError> {
        let bytecode = read_file(&part_path(prefix, "code"))?;
        let addresses = read_file(&part_path(prefix, "addr"))?;
        let references = read_file(&part_path(prefix, "ref"))?;
        Self::from_parts(bytecode, &addresses, &references)
    }
}

/// `<prefix>.<ext>`, appended rather than replacing any existing extension.
pub fn part_path(prefix: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ObjectError> {
    fs::write(path, bytes).map_err(|source| ObjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_file(path: &Path) -> Result<Vec<u8>, ObjectError> {
    fs::read(path).map_err(|source| ObjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a NUL-terminated name starting at `pos`; returns it and the position
/// after the terminator.
fn read_name(bytes: &[u8], pos: usize, table: &'static str) -> Result<(String, usize), ObjectError> {
    let len = bytes[pos..]
        .iter()
        .position(|&b| b == 0)
        .ok_or(ObjectError::Truncated { table, offset: pos })?;
    let name = std::str::from_utf8(&bytes[pos..pos + len])
        .map_err(|_| ObjectError::InvalidName { table, offset: pos })?;
    Ok((name.to_string(), pos + len + 1))
}

fn read_offset(bytes: &[u8], pos: usize, table: &'static str) -> Result<u16, ObjectError> {
    match bytes.get(pos..pos + 2) {
        Some(&[lo, hi]) => Ok(u16::from_le_bytes([lo, hi])),
        _ => Err(ObjectError::Truncated { table, offset: pos }),
    }
}

/// Decodes an address table.
pub fn decode_addresses(bytes: &[u8]) -> Result<BTreeMap<String, u16>, ObjectError> {
    let mut table = BTreeMap::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (name, next) = read_name(bytes, pos, "address")?;
        let offset = read_offset(bytes, next, "address")?;
        match table.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(offset);
            }
            Entry::Occupied(slot) => {
                return Err(ObjectError::DuplicateName {
                    name: slot.key().clone(),
                    offset: pos,
                });
            }
        }
        pos = next + 2;
    }
    Ok(table)
}

/// Decodes a reference table.
pub fn decode_references(bytes: &[u8]) -> Result<BTreeMap<u16, String>, ObjectError> {
    let mut table = BTreeMap::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let offset = read_offset(bytes, pos, "reference")?;
        let (name, next) = read_name(bytes, pos + 2, "reference")?;
        if table.insert(offset, name).is_some() {
            return Err(ObjectError::DuplicateReference { key: offset, offset: pos });
        }
        pos = next;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_encoding_layout() {
        let mut object = ObjectFile::new();
        object.references.insert(0x0104, "loop".to_string());
        assert_eq!(object.encode_references(), b"\x04\x01loop\0");
    }

    #[test]
    fn test_tables_sorted() {
        let mut object = ObjectFile::new();
        object.addresses.insert("zeta".to_string(), 0);
        object.addresses.insert("alpha".to_string(), 8);
        assert_eq!(object.encode_addresses(), b"alpha\0\x08\x00zeta\0\x00\x00");
    }

    #[test]
    fn test_decode_truncated_entries() {
        // Missing terminator
        assert!(matches!(
            decode_addresses(b"start"),
            Err(ObjectError::Truncated { table: "address", offset: 0 })
        ));
        // Offset cut short
        assert!(matches!(
            decode_addresses(b"start\0\x01"),
            Err(ObjectError::Truncated { table: "address", offset: 6 })
        ));
        assert!(matches!(
            decode_references(b"\x04"),
            Err(ObjectError::Truncated { table: "reference", .. })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert!(matches!(
            decode_references(b"\x00\x00\xFF\xFE\0"),
            Err(ObjectError::InvalidName { table: "reference", offset: 2 })
        ));
    }

    #[test]
    fn test_part_path_keeps_dots() {
        let path = part_path(Path::new("build/boot.v1"), "code");
        assert_eq!(path, PathBuf::from("build/boot.v1.code"));
    }
}
