//! Integration tests for merging and resolving objects.

use vm16::assembler::assemble;
use vm16::linker::{link, merge, resolve};
use vm16::{Bus, Cpu, LinkError, Memory, ObjectFile, Register};

fn object(source: &str) -> ObjectFile {
    assemble(source).unwrap()
}

fn immediate_at(image: &ObjectFile, offset: usize) -> u16 {
    u16::from_le_bytes([image.bytecode[offset + 2], image.bytecode[offset + 3]])
}

// ========== Single Object ==========

#[test]
fn test_single_object_resolves_in_place() {
    let image = link(&[object("JMP end\nWCYL\nLOCATE end\nSTSD")]).unwrap();

    assert_eq!(immediate_at(&image, 0), 8);
    // Tables survive linking for map output
    assert_eq!(image.addresses.get("end"), Some(&8));
    assert_eq!(image.references.len(), 1);
}

#[test]
fn test_resolve_patches_register_immediate_forms() {
    let mut single = object("MOVI CZ, data\nSTSD\nLOCATE data\nU16 0xBEEF");
    resolve(&mut single).unwrap();

    assert_eq!(single.bytecode[1], Register::Cz.index());
    assert_eq!(immediate_at(&single, 0), 8);
}

// ========== Multiple Objects ==========

#[test]
fn test_labels_relocated_by_preceding_size() {
    let main = object("CALL helper\nSTSD");
    let lib = object("WCYL\nLOCATE helper\nRET");

    let image = link(&[main, lib]).unwrap();

    assert_eq!(image.addresses.get("helper"), Some(&12));
    assert_eq!(immediate_at(&image, 0), 12);
}

#[test]
fn test_references_relocated_by_preceding_size() {
    let main = object("LOCATE start\nWCYL\nSTSD");
    let lib = object("WCYL\nJMP start");

    let image = link(&[main, lib]).unwrap();

    assert!(image.references.contains_key(&12));
    assert_eq!(immediate_at(&image, 12), 0);
}

#[test]
fn test_merge_does_not_patch() {
    let merged = merge(&[object("JMP there"), object("LOCATE there\nSTSD")]).unwrap();
    assert_eq!(immediate_at(&merged, 0), 0);
    assert_eq!(merged.addresses.get("there"), Some(&4));
}

#[test]
fn test_linked_program_runs() {
    let main = object("MOVI SB, 0x8000\nMOVI AZ, 5\nCALL add_three\nSTSD");
    let lib = object("LOCATE add_three\nADDI AZ, 3\nRET");
    let image = link(&[main, lib]).unwrap();

    let mut cpu = Cpu::new(Bus::new(Memory::with_image(0, &image.bytecode).unwrap()));
    cpu.run_for_steps(100).unwrap();

    assert!(cpu.is_halted());
    assert_eq!(cpu.reg(Register::Az), 8);
}

#[test]
fn test_link_order_changes_only_layout() {
    let a = object("LOCATE a\nJMP b");
    let b = object("LOCATE b\nJMP a");

    let ab = link(&[a.clone(), b.clone()]).unwrap();
    let ba = link(&[b, a]).unwrap();

    assert_eq!(ab.addresses.get("a"), Some(&0));
    assert_eq!(ba.addresses.get("a"), Some(&4));
    assert_eq!(immediate_at(&ab, 0), 4);
    assert_eq!(immediate_at(&ba, 0), 4);
}

// ========== Errors ==========

#[test]
fn test_undefined_reference() {
    let err = link(&[object("WCYL\nCALL missing")]).unwrap_err();
    assert_eq!(
        err,
        LinkError::UndefinedReference {
            offset: 4,
            label: "missing".to_string()
        }
    );
}

#[test]
fn test_duplicate_location_across_objects() {
    let err = link(&[object("LOCATE main\nSTSD"), object("LOCATE main\nRET")]).unwrap_err();
    assert_eq!(
        err,
        LinkError::DuplicateLocation {
            label: "main".to_string()
        }
    );
}

#[test]
fn test_reference_past_end_of_image() {
    let mut broken = object("LOCATE x\nSTSD");
    broken.references.insert(2, "x".to_string());

    assert!(matches!(
        resolve(&mut broken),
        Err(LinkError::ReferenceOutOfBounds { offset: 2, .. })
    ));
}

#[test]
fn test_image_too_large() {
    let half = ObjectFile {
        bytecode: vec![0; 0x8000],
        ..ObjectFile::default()
    };
    let err = link(&[half.clone(), half.clone(), half]).unwrap_err();
    assert_eq!(err, LinkError::ImageTooLarge { size: 0x18000 });
}

#[test]
fn test_error_messages() {
    let err = LinkError::UndefinedReference {
        offset: 0x10,
        label: "foo".to_string(),
    };
    assert_eq!(err.to_string(), "undefined-reference: 0x0010 refers to foo");
}
