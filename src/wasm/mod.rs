//! WebAssembly bindings for the vm16 machine.
//!
//! This module provides JavaScript-callable interfaces to the interpreter and
//! toolchain, enabling browser-based assembly and execution.

pub mod api;

pub use api::Emulator16;
