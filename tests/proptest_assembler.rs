//! Property-based tests for the assembler and linker.

use proptest::prelude::*;
use vm16::assembler::{assemble, ErrorType};
use vm16::disassembler::{formatter, DisassemblyOptions};
use vm16::linker::link;
use vm16::{AddressingMode, OPCODE_TABLE};

fn register_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "AZ", "BZ", "CZ", "DZ", "EZ", "FZ", "GZ", "HZ", "SP", "SB", "XA", "MO",
    ])
}

/// One source line for an arbitrary opcode with literal operands.
fn instruction_line() -> impl Strategy<Value = String> {
    (
        prop::sample::select(OPCODE_TABLE.to_vec()),
        register_name(),
        register_name(),
        any::<u16>(),
    )
        .prop_map(|(meta, r1, r2, imm)| match meta.addressing_mode {
            AddressingMode::None => meta.mnemonic.to_string(),
            AddressingMode::Reg => format!("{} {}", meta.mnemonic, r1),
            AddressingMode::RegReg => format!("{} {}, {}", meta.mnemonic, r1, r2),
            AddressingMode::RegImm => format!("{} {}, {}", meta.mnemonic, r1, imm),
            AddressingMode::Imm => format!("{} {}", meta.mnemonic, imm),
        })
}

proptest! {
    /// Labels used before definition resolve to the same bytes as labels
    /// defined first
    #[test]
    fn prop_forward_and_backward_labels_agree(filler in 0usize..20, body in 0usize..20) {
        let pad = "WCYL\n".repeat(filler);
        let middle = "WCYL\n".repeat(body);

        // Forward: the jump precedes its target
        let forward = format!("{pad}JMP target\n{middle}LOCATE target\nSTSD\n");
        // Backward: the target's address is fixed up front with a literal
        let target = (filler + 1 + body) * 4;
        let backward = format!("{pad}JMP {target}\n{middle}STSD\n");

        let forward = link(&[assemble(&forward).unwrap()]).unwrap();
        let backward = link(&[assemble(&backward).unwrap()]).unwrap();
        prop_assert_eq!(forward.bytecode, backward.bytecode);
    }

    /// Two-operand instructions with one operand are argument-count errors
    #[test]
    fn prop_missing_operand(meta in prop::sample::select(OPCODE_TABLE.to_vec()), reg in register_name()) {
        prop_assume!(meta.addressing_mode.arity() == 2);
        let err = assemble(&format!("{} {}", meta.mnemonic, reg)).unwrap_err();
        prop_assert_eq!(err.error_type, ErrorType::ArgumentCount);
        prop_assert_eq!(err.line, 1);
    }

    /// Listings of assembled code re-assemble to the same bytes
    #[test]
    fn prop_listing_reassembles(lines in prop::collection::vec(instruction_line(), 1..40)) {
        let source = lines.join("\n");
        let object = assemble(&source).unwrap();

        let listing = formatter::format_listing(&object.bytecode, DisassemblyOptions::default());
        let text: Vec<&str> = listing.lines().map(|line| &line[6..]).collect();
        let again = assemble(&text.join("\n")).unwrap();

        prop_assert_eq!(again.bytecode, object.bytecode);
    }

    /// Immediates above 65535 are range errors
    #[test]
    fn prop_immediate_range(value in 65536u32..1_000_000) {
        let err = assemble(&format!("MOVI AZ, {}", value)).unwrap_err();
        prop_assert_eq!(err.error_type, ErrorType::RangeError);
    }
}

#[test]
fn test_labels_backward_and_forward_in_one_file() {
    let source = "\
LOCATE a
    JMP b
LOCATE b
    JMP a
";
    let image = link(&[assemble(source).unwrap()]).unwrap();
    assert_eq!(image.bytecode, vec![0x40, 0, 4, 0, 0x40, 0, 0, 0]);
}
