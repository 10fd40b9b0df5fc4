//! # Linker
//!
//! Turns one or more [`ObjectFile`]s into a loadable image.
//!
//! 1. **Merge**: concatenate bytecode in input order. Each object's address
//!    entries and reference keys are shifted by the combined length of the
//!    objects before it. A label defined by more than one object is a
//!    [`LinkError::DuplicateLocation`].
//! 2. **Resolve**: for every reference, look up its label and write the 16-bit
//!    little-endian address into the immediate field of the referencing
//!    instruction.
//!
//! A single object goes through the same path; merging one object is the
//! identity.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::encoding::IMMEDIATE_OFFSET;
use crate::memory::MEMORY_SIZE;
use crate::object::ObjectFile;

/// Errors that abort linking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("undefined-reference: 0x{offset:04X} refers to {label}")]
    UndefinedReference { offset: u16, label: String },

    /// The same label is defined by more than one object.
    #[error("duplicate-location: {label}")]
    DuplicateLocation { label: String },

    /// The patched field would extend past the end of the bytecode.
    #[error("reference-out-of-bounds: 0x{offset:04X} ({label})")]
    ReferenceOutOfBounds { offset: u16, label: String },

    /// The concatenated bytecode does not fit the address space.
    #[error("image-too-large: {size} bytes")]
    ImageTooLarge { size: usize },
}

/// Concatenates objects and relocates their tables.
///
/// # Errors
///
/// [`LinkError::ImageTooLarge`] if the combined bytecode exceeds 64 KiB, or
/// [`LinkError::DuplicateLocation`] if two objects define the same label.
pub fn merge(objects: &[ObjectFile]) -> Result<ObjectFile, LinkError> {
    let size: usize = objects.iter().map(|object| object.bytecode.len()).sum();
    if size > MEMORY_SIZE {
        return Err(LinkError::ImageTooLarge { size });
    }

    let mut merged = ObjectFile::new();

    for object in objects {
        // A full 64 KiB prefix leaves no addressable offset for what follows
        let base = u16::try_from(merged.bytecode.len()).map_err(|_| LinkError::ImageTooLarge { size })?;

        for (name, offset) in &object.addresses {
            if merged.addresses.contains_key(name) {
                return Err(LinkError::DuplicateLocation {
                    label: name.clone(),
                });
            }
            merged.addresses.insert(name.clone(), base.wrapping_add(*offset));
        }

        for (offset, name) in &object.references {
            merged.references.insert(base.wrapping_add(*offset), name.clone());
        }

        merged.bytecode.extend_from_slice(&object.bytecode);
    }

    tracing::debug!(
        "merged {} object(s): {} bytes, {} labels, {} references",
        objects.len(),
        merged.bytecode.len(),
        merged.addresses.len(),
        merged.references.len()
    );
    Ok(merged)
}

/// Patches every reference of `object` in place using its own address table.
///
/// The tables are left untouched so callers can still report them.
pub fn resolve(object: &mut ObjectFile) -> Result<(), LinkError> {
    resolve_with(&mut object.bytecode, &object.references, &object.addresses)
}

fn resolve_with(
    bytecode: &mut [u8],
    references: &BTreeMap<u16, String>,
    addresses: &BTreeMap<String, u16>,
) -> Result<(), LinkError> {
    for (&offset, label) in references {
        let address = *addresses
            .get(label)
            .ok_or_else(|| LinkError::UndefinedReference {
                offset,
                label: label.clone(),
            })?;

        let field = offset as usize + IMMEDIATE_OFFSET;
        let slot = bytecode
            .get_mut(field..field + 2)
            .ok_or_else(|| LinkError::ReferenceOutOfBounds {
                offset,
                label: label.clone(),
            })?;
        slot.copy_from_slice(&address.to_le_bytes());

        tracing::debug!("0x{:04X}: {} -> 0x{:04X}", offset, label, address);
    }
    Ok(())
}

/// Merges and resolves `objects` into a final image.
///
/// The result keeps the merged address and reference tables.
///
/// # Examples
///
/// ```
/// use vm16::assembler::assemble;
/// use vm16::linker::{link, LinkError};
///
/// let main = assemble("JMP helper").unwrap();
/// let lib = assemble("LOCATE helper\nSTSD").unwrap();
///
/// let image = link(&[main, lib]).unwrap();
/// // JMP's immediate now holds helper's relocated offset, 4
/// assert_eq!(&image.bytecode[..4], &[0x40, 0x00, 0x04, 0x00]);
///
/// let err = link(&[assemble("JMP nowhere").unwrap()]).unwrap_err();
/// assert!(matches!(err, LinkError::UndefinedReference { .. }));
/// ```
pub fn link(objects: &[ObjectFile]) -> Result<ObjectFile, LinkError> {
    let mut image = merge(objects)?;
    resolve(&mut image)?;
    Ok(image)
}
