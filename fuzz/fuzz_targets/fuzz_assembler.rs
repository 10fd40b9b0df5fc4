//! Fuzz target for the assembler.
//!
//! Feeds arbitrary text through assembly and, when that succeeds, through
//! linking, looking for panics in parsing, encoding and patching.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vm16::{assembler, linker, MEMORY_SIZE};

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    let Ok(object) = assembler::assemble(&source) else {
        return;
    };

    // Every reference key points at an instruction inside the bytecode
    for &offset in object.references.keys() {
        assert!(offset as usize + 4 <= object.bytecode.len());
    }
    assert!(object.bytecode.len() <= MEMORY_SIZE);

    // Unresolved labels are fine; panics are not
    let _ = linker::link(&[object]);
});
