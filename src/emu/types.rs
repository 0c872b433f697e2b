/// Outcome of a single CPU cycle.
pub enum Chip8Result {
    /// Keep executing instructions in the current frame.
    Continue,
    /// Hold further instructions until the next frame
    /// (after a draw, or while waiting for a key).
    WaitForNextFrame,
}

/// Errors raised by the CHIP-8 virtual machine.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("Stack underflow: attempted to return from a subroutine with empty call stack")]
    StackUnderflow,

    #[error("Stack overflow: more than {depth} nested subroutine calls")]
    StackOverflow { depth: usize },

    #[error("Unknown opcode {opcode:#06X} at address {address:#06X}")]
    UnknownOpcode { opcode: u16, address: u16 },
}

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// A type alias for the CHIP-8 display buffer representation
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];
