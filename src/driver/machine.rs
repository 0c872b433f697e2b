use std::num::NonZeroU32;

use winit::keyboard::PhysicalKey;

use super::Surface;

/// Capabilities the driver needs from a virtual machine.
///
/// The driver only ever calls these; it never looks at memory, registers,
/// key state or the frame buffer directly.
pub trait Machine {
    type Error: std::error::Error + 'static;

    /// Returns the machine to its power-on state. Memory, registers, display,
    /// timers and key state are all cleared.
    fn reset(&mut self);

    /// Copies a program into memory at the machine's load address.
    fn load_game(&mut self, rom: &[u8]) -> Result<(), Self::Error>;

    /// Executes one instruction.
    fn tick(&mut self) -> Result<(), Self::Error>;

    /// Decrements the delay and sound timers by one.
    fn tick_timers(&mut self);

    /// Updates one logical key. Keys outside the keypad are ignored.
    fn keypress(&mut self, key: PhysicalKey, pressed: bool);

    /// Paints the current frame buffer onto `surface`, `scale` surface pixels
    /// per display pixel.
    fn draw_screen(&self, surface: &mut dyn Surface, scale: NonZeroU32);
}
