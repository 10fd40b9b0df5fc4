//! Assembles two source units, links them and runs the result.
//!
//! Run with `cargo run --example assemble_and_run`.

use vm16::disassembler::{formatter::Listing, DisassemblyOptions};
use vm16::{assembler, linker, Machine, Register};

const MAIN: &str = "
    MOVI  AZ, 6
    MOVI  BZ, 7
    CALL  multiply
    STSD
";

const LIBRARY: &str = "
; CZ = AZ * BZ
LOCATE multiply
    MOV   CZ, AZ
    MUL   CZ, BZ
    RET
";

fn main() {
    let mut objects = Vec::new();
    for (name, source) in [("main", MAIN), ("library", LIBRARY)] {
        match assembler::assemble(source) {
            Ok(object) => {
                println!(
                    "{}: {} bytes, {} labels",
                    name,
                    object.bytecode.len(),
                    object.addresses.len()
                );
                objects.push(object);
            }
            Err(error) => {
                eprintln!("{}: {}", name, error);
                return;
            }
        }
    }

    let image = match linker::link(&objects) {
        Ok(image) => image,
        Err(error) => {
            eprintln!("link failed: {}", error);
            return;
        }
    };

    println!("\nLinked image:");
    print!("{}", Listing::new(&image.bytecode, DisassemblyOptions::default()));

    let mut machine = match Machine::from_image(&image.bytecode) {
        Ok(machine) => machine,
        Err(error) => {
            eprintln!("boot failed: {}", error);
            return;
        }
    };

    if let Err(error) = machine.run_tick(1_000) {
        eprintln!("execution stopped: {}", error);
    }

    println!("\n6 * 7 = {}", machine.cpu().reg(Register::Cz));
    print!("{}", machine.register_report());
}
