//! Host keyboard to CHIP-8 keypad mapping.
//!
//! ```text
//! 1 2 3 4      1 2 3 C
//! Q W E R  ->  4 5 6 D
//! A S D F      7 8 9 E
//! Z X C V      A 0 B F
//! ```

use winit::keyboard::{KeyCode, PhysicalKey};

use crate::u4;

/// Physical key for each keypad button, indexed by button value.
pub const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x0
    KeyCode::Digit1, // 0x1
    KeyCode::Digit2, // 0x2
    KeyCode::Digit3, // 0x3
    KeyCode::KeyQ,   // 0x4
    KeyCode::KeyW,   // 0x5
    KeyCode::KeyE,   // 0x6
    KeyCode::KeyA,   // 0x7
    KeyCode::KeyS,   // 0x8
    KeyCode::KeyD,   // 0x9
    KeyCode::KeyZ,   // 0xA
    KeyCode::KeyC,   // 0xB
    KeyCode::Digit4, // 0xC
    KeyCode::KeyR,   // 0xD
    KeyCode::KeyF,   // 0xE
    KeyCode::KeyV,   // 0xF
];

/// Returns the keypad button for a host key, if it has one.
pub fn translate(key: PhysicalKey) -> Option<u4> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };

    KEY_MAP
        .iter()
        .position(|&k| k == code)
        .map(|button| u4::new(button as u8))
}
