//! Host-facing drive loop: keypad translation, ROM loading, fixed-rate
//! scheduling, rendering and the session that ties them to one [`Machine`].

mod config;
pub mod keypad;
mod machine;
mod render;
mod rom;
mod scheduler;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use config::*;
pub use machine::*;
pub use render::*;
pub use rom::*;
pub use scheduler::*;
pub use session::*;
