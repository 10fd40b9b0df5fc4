//! Console device with a program that echoes its input back in upper case.
//!
//! Bytes are queued into the receive FIFO as if typed at a terminal. The
//! program polls the status port, converts `a`..`z` and writes each byte back
//! until it sees a newline.
//!
//! Run with `cargo run --example console_echo`.

use std::io::Write;

use vm16::devices::console::{CONSOLE_DATA_PORT, CONSOLE_STATUS_PORT};
use vm16::{assembler, linker, ConsoleDevice, Machine};

const ECHO: &str = "
LOCATE wait
    IN    AZ, 0x11      ; status
    ANDI  AZ, 1         ; byte ready?
    CMPI  AZ, 1
    JNE   wait
    IN    BZ, 0x10
    CMPI  BZ, 0x61
    JL    send
    CMPI  BZ, 0x7A
    JG    send
    SUBI  BZ, 0x20
LOCATE send
    OUT   BZ, 0x10
    CMPI  BZ, 0x0A
    JNE   wait
    STSD
";

fn main() {
    println!("Console echo example");
    println!(
        "data port 0x{:02X}, status port 0x{:02X}\n",
        CONSOLE_DATA_PORT, CONSOLE_STATUS_PORT
    );

    let built = assembler::assemble(ECHO)
        .map_err(|e| e.to_string())
        .and_then(|object| linker::link(&[object]).map_err(|e| e.to_string()));
    let image = match built {
        Ok(image) => image,
        Err(error) => {
            eprintln!("build failed: {}", error);
            return;
        }
    };

    let mut machine = match Machine::from_image(&image.bytecode) {
        Ok(machine) => machine,
        Err(error) => {
            eprintln!("boot failed: {}", error);
            return;
        }
    };

    let mut console = ConsoleDevice::new();
    console.set_transmit_callback(|byte| {
        print!("{}", byte as char);
        let _ = std::io::stdout().flush();
    });
    let console = match machine.attach_console(console) {
        Ok(console) => console,
        Err(error) => {
            eprintln!("attach failed: {}", error);
            return;
        }
    };

    let input = "Hello, vm16!\n";
    println!("Input:  {}", input.trim_end());
    for &byte in input.as_bytes() {
        console.borrow_mut().receive_byte(byte);
    }
    println!("Queued: {} bytes", console.borrow().rx_buffer_len());
    print!("Output: ");

    for _ in 0..100 {
        if machine.is_halted() {
            break;
        }
        if let Err(error) = machine.run_tick(100) {
            eprintln!("\nexecution stopped: {}", error);
            return;
        }
    }

    println!("Steps:  {}", machine.cpu().steps());
}
