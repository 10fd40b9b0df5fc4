//! Tests for IN/OUT and port binding on the bus.

use std::cell::RefCell;
use std::rc::Rc;

use vm16::{
    Bus, BusError, Cpu, ExecutionError, InstructionWord, Memory, Opcode, PortDevice, Register,
    PORT_SENTINEL,
};

fn ri(opcode: Opcode, reg: Register, imm: u16) -> InstructionWord {
    InstructionWord::new(opcode.code(), reg.index(), imm)
}

/// Helper function to create a CPU with `program` loaded at 0x0000
fn setup_cpu(program: &[InstructionWord]) -> Cpu {
    let image: Vec<u8> = program.iter().flat_map(|word| word.to_bytes()).collect();
    Cpu::new(Bus::new(Memory::with_image(0, &image).unwrap()))
}

/// Records every OUT and answers IN with a fixed value.
#[derive(Default)]
struct Recorder {
    written: Vec<(u16, u16)>,
    reads: usize,
}

impl PortDevice for Recorder {
    fn port_in(&mut self, port: u16) -> u16 {
        self.reads += 1;
        port * 2
    }

    fn port_out(&mut self, port: u16, data: u16) {
        self.written.push((port, data));
    }
}

// ========== Function Handlers ==========

#[test]
fn test_in_from_handler_gets_sentinel() {
    let mut cpu = setup_cpu(&[ri(Opcode::In, Register::Az, 0x0001)]);
    cpu.bus_mut().bind_fn(0x0001, |data| data).unwrap();

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::Az), PORT_SENTINEL);
}

#[test]
fn test_out_passes_register_value() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut cpu = setup_cpu(&[ri(Opcode::Out, Register::Bz, 0x0042)]);
    cpu.bus_mut()
        .bind_fn(0x0042, move |data| {
            sink.borrow_mut().push(data);
            0
        })
        .unwrap();
    cpu.set_reg(Register::Bz, 0x1234);

    cpu.step().unwrap();

    assert_eq!(*seen.borrow(), vec![0x1234]);
}

// ========== Multi-Port Devices ==========

#[test]
fn test_shared_device_sees_port_number() {
    let mut cpu = setup_cpu(&[
        ri(Opcode::Out, Register::Az, 0x20),
        ri(Opcode::Out, Register::Bz, 0x21),
        ri(Opcode::In, Register::Cz, 0x21),
    ]);
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    cpu.bus_mut()
        .attach(Rc::clone(&recorder), &[0x20, 0x21])
        .unwrap();
    cpu.set_reg(Register::Az, 1);
    cpu.set_reg(Register::Bz, 2);

    cpu.run_for_steps(3).unwrap();

    assert_eq!(recorder.borrow().written, vec![(0x20, 1), (0x21, 2)]);
    assert_eq!(cpu.reg(Register::Cz), 0x42);
}

#[test]
fn test_attach_conflict_binds_nothing() {
    let mut bus = Bus::new(Memory::new());
    bus.bind_fn(0x31, |_| 0).unwrap();

    let recorder = Rc::new(RefCell::new(Recorder::default()));
    assert_eq!(
        bus.attach(recorder, &[0x30, 0x31]),
        Err(BusError::DuplicatePort(0x31))
    );
    assert!(!bus.is_bound(0x30));
}

#[test]
fn test_attach_repeated_port_binds_nothing() {
    let mut bus = Bus::new(Memory::new());
    let recorder = Rc::new(RefCell::new(Recorder::default()));

    assert_eq!(
        bus.attach(recorder, &[0x20, 0x21, 0x20]),
        Err(BusError::DuplicatePort(0x20))
    );
    assert!(!bus.is_bound(0x20));
    assert!(!bus.is_bound(0x21));
}

// ========== Errors ==========

#[test]
fn test_duplicate_bind_keeps_first_handler() {
    let mut bus = Bus::new(Memory::new());
    bus.bind_fn(0x10, |_| 1).unwrap();

    assert_eq!(bus.bind_fn(0x10, |_| 2), Err(BusError::DuplicatePort(0x10)));
    assert_eq!(bus.device_in(0x10).unwrap(), 1);
}

#[test]
fn test_unbound_in_leaves_register() {
    let mut cpu = setup_cpu(&[ri(Opcode::In, Register::Az, 0x0099)]);
    cpu.set_reg(Register::Az, 0x5555);

    let err = cpu.step().unwrap_err();

    assert_eq!(err, ExecutionError::Bus(BusError::UnboundPort(0x0099)));
    assert_eq!(cpu.reg(Register::Az), 0x5555);
}

#[test]
fn test_unbound_out_fails() {
    let mut cpu = setup_cpu(&[ri(Opcode::Out, Register::Az, 0x0100)]);

    assert_eq!(
        cpu.step(),
        Err(ExecutionError::Bus(BusError::UnboundPort(0x0100)))
    );
}

#[test]
fn test_in_to_illegal_register_does_not_touch_device() {
    let mut cpu = setup_cpu(&[InstructionWord::new(Opcode::In.code(), 14, 0x20)]);
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    cpu.bus_mut().attach(Rc::clone(&recorder), &[0x20]).unwrap();

    assert!(matches!(
        cpu.step(),
        Err(ExecutionError::IllegalRegister { index: 14, .. })
    ));
    assert_eq!(recorder.borrow().reads, 0);
}
