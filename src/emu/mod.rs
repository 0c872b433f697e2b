//! The CHIP-8 virtual machine driven by [`crate::driver`].

mod chip8;
mod execute;
mod font;
mod opcode;
mod types;

pub use chip8::*;
pub use font::*;
pub use opcode::*;
pub use types::*;
