//! Tests for the three-part object format on disk.

use std::fs;
use std::path::PathBuf;

use vm16::assembler::assemble;
use vm16::object::{decode_addresses, decode_references, part_path};
use vm16::{ObjectError, ObjectFile};

/// A per-test prefix in the system temp directory.
fn temp_prefix(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vm16-object-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn test_write_then_read() {
    let object = assemble("LOCATE main\nCALL helper\nSTSD\nLOCATE data\nSTR /ok/").unwrap();
    let prefix = temp_prefix("program");

    object.write(&prefix).unwrap();
    let loaded = ObjectFile::read(&prefix).unwrap();

    assert_eq!(loaded, object);
    assert_eq!(fs::read(part_path(&prefix, "code")).unwrap(), object.bytecode);
}

#[test]
fn test_part_paths_append_extension() {
    let prefix = PathBuf::from("build/main.o");
    assert_eq!(part_path(&prefix, "code"), PathBuf::from("build/main.o.code"));
    assert_eq!(part_path(&prefix, "ref"), PathBuf::from("build/main.o.ref"));
}

#[test]
fn test_table_layout() {
    let object = assemble("LOCATE ab\nJMP ab").unwrap();
    assert_eq!(object.encode_addresses(), b"ab\0\x00\x00");
    assert_eq!(object.encode_references(), b"\x00\x00ab\0");
}

#[test]
fn test_empty_tables() {
    let object = assemble("STSD").unwrap();
    assert!(object.encode_addresses().is_empty());
    assert!(object.encode_references().is_empty());
}

#[test]
fn test_missing_part_is_io_error() {
    let prefix = temp_prefix("does-not-exist");
    match ObjectFile::read(&prefix) {
        Err(ObjectError::Io { path, .. }) => assert_eq!(path, part_path(&prefix, "code")),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn test_truncated_tables() {
    assert!(matches!(
        decode_addresses(b"name"),
        Err(ObjectError::Truncated { table: "address", .. })
    ));
    assert!(matches!(
        decode_addresses(b"name\0\x01"),
        Err(ObjectError::Truncated { table: "address", .. })
    ));
    assert!(matches!(
        decode_references(b"\x04"),
        Err(ObjectError::Truncated { table: "reference", .. })
    ));
    assert!(matches!(
        decode_references(b"\x04\x00loop"),
        Err(ObjectError::Truncated { table: "reference", .. })
    ));
}

#[test]
fn test_invalid_name_encoding() {
    assert!(matches!(
        decode_addresses(b"\xFF\xFE\0\x00\x00"),
        Err(ObjectError::InvalidName { .. })
    ));
}

#[test]
fn test_label_defined_twice_is_rejected() {
    let code = vec![0x40, 0x00, 0x00, 0x00, 0x58, 0x00, 0x00, 0x00];
    let result = ObjectFile::from_parts(code, b"START\0\x00\x00START\0\x04\x00", b"\x00\x00START\0");
    match result {
        Err(ObjectError::DuplicateName { name, offset }) => {
            assert_eq!(name, "START");
            assert_eq!(offset, 8);
        }
        other => panic!("expected DuplicateName, got {:?}", other),
    }
}

#[test]
fn test_reference_listed_twice_is_rejected() {
    assert!(matches!(
        decode_references(b"\x04\x00one\0\x04\x00two\0"),
        Err(ObjectError::DuplicateReference { key: 0x0004, offset: 6 })
    ));
}
