//! CHIP-8 execution driver.
//!
//! [`driver`] owns the runtime loop around a [`driver::Machine`]: it forwards
//! keys, loads ROMs through the reload protocol and steps the machine a fixed
//! number of instructions per presented frame. [`emu`] provides the CHIP-8
//! machine it drives.

pub mod driver;
pub mod emu;
mod nibble;

pub use nibble::u4;
