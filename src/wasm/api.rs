//! WASM API for the vm16 machine.
//!
//! Provides JavaScript-callable interfaces for CPU control, state inspection,
//! and assembly/disassembly operations.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::disassembler::{decoder, formatter};
use crate::encoding::INSTRUCTION_SIZE;
use crate::{assembler, linker, ConsoleDevice, InstructionWord, Machine, Register, REGISTERS};

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

/// Result of an assemble-and-link operation
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    success: bool,
    machine_code: Vec<u8>,
    error_message: Option<String>,
    error_line: Option<usize>,
}

#[wasm_bindgen]
impl AssemblyResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn machine_code(&self) -> Vec<u8> {
        self.machine_code.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.error_message.clone()
    }

    /// Source line of an assembly error; absent for link errors
    #[wasm_bindgen(getter)]
    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }
}

impl AssemblyResult {
    fn failed(message: String, line: Option<usize>) -> Self {
        AssemblyResult {
            success: false,
            machine_code: Vec::new(),
            error_message: Some(message),
            error_line: line,
        }
    }
}

/// One disassembled instruction word
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DisassemblyLine {
    address: u16,
    bytes: Vec<u8>,
    text: String,
}

#[wasm_bindgen]
impl DisassemblyLine {
    #[wasm_bindgen(getter)]
    pub fn address(&self) -> u16 {
        self.address
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.text.clone()
    }
}

/// Main emulator interface for JavaScript
///
/// The machine has the clock and a serial console attached. Console output
/// is forwarded to the `on_transmit` callback one character at a time.
#[wasm_bindgen]
pub struct Emulator16 {
    machine: Machine,
    console: Rc<RefCell<ConsoleDevice>>,
    on_transmit: js_sys::Function,
    program: Vec<u8>,
}

fn build_machine(
    image: &[u8],
    on_transmit: &js_sys::Function,
) -> Result<(Machine, Rc<RefCell<ConsoleDevice>>), JsError> {
    let mut machine =
        Machine::from_image(image).map_err(|e| JsError::new(&e.to_string()))?;

    let callback = on_transmit.clone();
    let mut console = ConsoleDevice::new();
    console.set_transmit_callback(move |byte| {
        let text = char::from(byte).to_string();
        let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&text));
    });
    let console = machine
        .attach_console(console)
        .map_err(|e| JsError::new(&e.to_string()))?;

    Ok((machine, console))
}

#[wasm_bindgen]
impl Emulator16 {
    /// Create an emulator with empty memory
    #[wasm_bindgen(constructor)]
    pub fn new(on_transmit: js_sys::Function) -> Result<Emulator16, JsError> {
        let (machine, console) = build_machine(&[], &on_transmit)?;
        Ok(Emulator16 {
            machine,
            console,
            on_transmit,
            program: Vec::new(),
        })
    }

    /// Execute a single instruction
    pub fn step(&mut self) -> Result<(), JsError> {
        self.machine
            .step()
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Execute up to `steps` instructions and return how many retired
    pub fn run_for_steps(&mut self, steps: u32) -> Result<u32, JsError> {
        self.machine
            .run_tick(steps as u64)
            .map(|retired| retired as u32)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Rebuild the machine from the last loaded program
    ///
    /// Unlike a RESET from inside the program, this also restores memory.
    pub fn reset(&mut self) -> Result<(), JsError> {
        let (machine, console) = build_machine(&self.program, &self.on_transmit)?;
        self.machine = machine;
        self.console = console;
        Ok(())
    }

    // Register getters

    /// Register value by name, e.g. "AZ"; 0 for unknown names
    pub fn register(&self, name: &str) -> u16 {
        Register::from_name(name).map_or(0, |reg| self.machine.cpu().reg(reg))
    }

    /// All named registers, AZ through MO
    pub fn registers(&self) -> Vec<u16> {
        REGISTERS
            .iter()
            .map(|&reg| self.machine.cpu().reg(reg))
            .collect()
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.machine.cpu().pc()
    }

    #[wasm_bindgen(getter)]
    pub fn flags(&self) -> u16 {
        self.machine.cpu().flags().bits()
    }

    #[wasm_bindgen(getter)]
    pub fn halted(&self) -> bool {
        self.machine.is_halted()
    }

    #[wasm_bindgen(getter)]
    pub fn steps(&self) -> f64 {
        self.machine.cpu().steps() as f64 // u64 has no JS number equivalent
    }

    /// Set the program counter
    pub fn set_pc(&mut self, addr: u16) {
        self.machine.cpu_mut().set_pc(addr);
    }

    // Console methods

    /// Queue a byte typed into the terminal
    pub fn receive_char(&mut self, byte: u8) {
        self.console.borrow_mut().receive_byte(byte);
    }

    // Memory access methods

    pub fn read_memory(&self, addr: u16) -> u8 {
        self.machine.cpu().bus().memory().read8(addr)
    }

    pub fn write_memory(&mut self, addr: u16, value: u8) {
        self.machine.cpu_mut().bus_mut().memory_mut().write8(addr, value);
    }

    /// Read a 256-byte page from memory (for efficient display)
    pub fn get_memory_page(&self, page: u8) -> Vec<u8> {
        let start = (page as usize) << 8;
        self.machine.memory_dump()[start..start + 256].to_vec()
    }

    /// Load a flat image at address 0 and reboot
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), JsError> {
        self.program = program.to_vec();
        self.reset()
    }

    /// Assemble and link a single source file
    pub fn assemble(&self, source: String) -> AssemblyResult {
        let object = match assembler::assemble(&source) {
            Ok(object) => object,
            Err(err) => return AssemblyResult::failed(err.message, Some(err.line)),
        };
        match linker::link(&[object]) {
            Ok(image) => AssemblyResult {
                success: true,
                machine_code: image.bytecode,
                error_message: None,
                error_line: None,
            },
            Err(err) => AssemblyResult::failed(err.to_string(), None),
        }
    }

    /// Assemble, link and load in one step
    pub fn assemble_and_load(&mut self, source: String) -> Result<AssemblyResult, JsError> {
        let result = self.assemble(source);
        if result.success {
            self.load_program(&result.machine_code)?;
        }
        Ok(result)
    }

    /// Disassemble `count` instruction words starting at an address
    pub fn disassemble(&self, start_addr: u16, count: u32) -> Vec<JsValue> {
        let memory = self.machine.memory_dump();
        (0..count as usize)
            .map_while(|i| {
                let address = start_addr as usize + i * INSTRUCTION_SIZE;
                let bytes = memory.get(address..address + INSTRUCTION_SIZE)?;
                let word = InstructionWord::from_bytes(bytes)?;
                let instr = decoder::decode_word(word, address as u16);
                Some(JsValue::from(DisassemblyLine {
                    address: address as u16,
                    bytes: bytes.to_vec(),
                    text: formatter::format_instruction(&instr),
                }))
            })
            .collect()
    }

    /// Length of the loaded program in bytes
    #[wasm_bindgen(getter)]
    pub fn program_len(&self) -> usize {
        self.program.len()
    }
}
