use std::num::NonZeroU32;

use log::trace;
use winit::keyboard::PhysicalKey;

use super::{
    Chip8Error, Chip8Result, DISPLAY_X, DISPLAY_Y, Display, FONT, FONT_END_ADDRESS,
    FONT_START_ADDRESS, Opcode,
};
use crate::driver::{Machine, Surface, keypad};
use crate::u4;

// Fixed by the CHIP-8 memory map
pub(crate) const ROM_START_ADDRESS: usize = 0x200;
pub(crate) const MEMORY_SIZE: usize = 4096;
pub(crate) const STACK_SIZE: usize = 16;

/// CHIP-8 virtual machine state
pub struct Chip8 {
    /// 4KB memory array
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// Display buffer: 64x32 monochrome pixels
    pub(crate) display: Display<bool>,

    pub(crate) pc: u16,
    pub(crate) i: u16,
    /// General-purpose registers V0-VF (VF is used as a flag register)
    pub(crate) v: [u8; 16],
    pub(crate) stack: Vec<u16>,

    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,

    /// Key held during FX0A, waiting to be released
    pub(crate) wait_release_key: Option<u4>,
    pub(crate) keypad: [bool; 16],

    /// Set once a draw or key wait ends the frame early; cleared by the timer step.
    frame_done: bool,
}

impl Chip8 {
    pub fn new() -> Self {
        let mut chip8 = Chip8 {
            memory: [0; MEMORY_SIZE],
            display: [[false; DISPLAY_X]; DISPLAY_Y],
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: Vec::new(),
            delay_timer: 0,
            sound_timer: 0,
            wait_release_key: None,
            keypad: [false; 16],
            frame_done: false,
        };
        chip8.memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);
        chip8
    }

    /// Copies a ROM to the program start address.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        let rom_end = ROM_START_ADDRESS + rom.len();
        self.memory
            .get_mut(ROM_START_ADDRESS..rom_end)
            .ok_or(Chip8Error::RomTooLarge {
                size: rom.len(),
                max_size: MEMORY_SIZE - ROM_START_ADDRESS,
            })?
            .copy_from_slice(rom);

        self.pc = ROM_START_ADDRESS as u16;

        Ok(())
    }

    /// Executes a single CPU cycle (fetch, decode, execute).
    pub fn cpu_cycle(&mut self) -> Result<Chip8Result, Chip8Error> {
        let address = self.pc;
        let word = self.fetch()?;
        let opcode = Opcode::decode(word).ok_or(Chip8Error::UnknownOpcode {
            opcode: word,
            address,
        })?;
        self.execute(opcode)
    }

    /// Decrements the delay and sound timers, floored at zero.
    pub fn timers_cycle(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    fn fetch(&mut self) -> Result<u16, Chip8Error> {
        let high = *self.mem_get(self.pc)?;
        let low = *self.mem_get(self.pc.wrapping_add(1))?;

        Ok(u16::from_be_bytes([high, low]))
    }

    pub(crate) fn mem_get(&mut self, addr: u16) -> Result<&mut u8, Chip8Error> {
        self.memory
            .get_mut(addr as usize)
            .ok_or(Chip8Error::MemoryOutOfBounds { address: addr })
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for Chip8 {
    type Error = Chip8Error;

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn load_game(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        self.load(rom)
    }

    fn tick(&mut self) -> Result<(), Chip8Error> {
        if self.frame_done {
            return Ok(());
        }

        if let Chip8Result::WaitForNextFrame = self.cpu_cycle()? {
            self.frame_done = true;
        }

        Ok(())
    }

    fn tick_timers(&mut self) {
        self.timers_cycle();
        self.frame_done = false;
    }

    fn keypress(&mut self, key: PhysicalKey, pressed: bool) {
        match keypad::translate(key) {
            Some(button) => self.set_key(button, pressed),
            None => trace!("Ignoring unmapped key {key:?}"),
        }
    }

    fn draw_screen(&self, surface: &mut dyn Surface, scale: NonZeroU32) {
        let scale = scale.get();

        for (y, row) in self.display.iter().enumerate() {
            for (x, &lit) in row.iter().enumerate() {
                if lit {
                    surface.fill_rect(x as u32 * scale, y as u32 * scale, scale, scale);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::driver::testing::{MockHost, RecordingSurface, SurfaceOp};
    use crate::driver::{DriverConfig, Rom, Session, SessionError, SessionState};

    fn with_program(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::new();
        chip8.load_game(program).unwrap();
        chip8
    }

    #[test]
    fn load_places_rom_at_program_start() {
        let chip8 = with_program(&[0x00, 0xE0, 0x60, 0x0A]);

        assert_eq!(chip8.memory[0x200..0x204], [0x00, 0xE0, 0x60, 0x0A]);
        assert_eq!(chip8.pc, 0x200);
    }

    #[test]
    fn load_rejects_oversized_rom() {
        let mut chip8 = Chip8::new();
        let rom = vec![0xAA; MEMORY_SIZE - ROM_START_ADDRESS + 1];

        let err = chip8.load_game(&rom).unwrap_err();
        assert!(matches!(err, Chip8Error::RomTooLarge { max_size: 3584, .. }));
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut chip8 = with_program(&[0x60, 0x0A, 0xF0, 0x15]);
        chip8.tick().unwrap();
        chip8.tick().unwrap();
        chip8.set_key(u4::new(3), true);
        chip8.display[0][0] = true;

        chip8.reset();

        assert_eq!(chip8.v, [0; 16]);
        assert_eq!(chip8.delay_timer, 0);
        assert_eq!(chip8.pc, 0x200);
        assert_eq!(chip8.memory[0x200], 0);
        assert_eq!(chip8.keypad, [false; 16]);
        assert!(!chip8.display[0][0]);
        assert_eq!(chip8.memory[FONT_START_ADDRESS..FONT_END_ADDRESS], FONT);
    }

    #[test]
    fn timers_floor_at_zero() {
        let mut chip8 = with_program(&[0x60, 0x02, 0xF0, 0x15]);
        chip8.tick().unwrap();
        chip8.tick().unwrap();

        for _ in 0..5 {
            chip8.tick_timers();
        }
        assert_eq!(chip8.delay_timer, 0);
    }

    #[test]
    fn unknown_opcode_is_an_error() {
        let mut chip8 = with_program(&[0xFF, 0xFF]);

        let err = chip8.tick().unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::UnknownOpcode { opcode: 0xFFFF, address: 0x200 }
        ));
    }

    #[test]
    fn draw_holds_remaining_ticks_until_timer_step() {
        // Draw font digit 0, then set V1 = 7
        let mut chip8 = with_program(&[0xA0, 0x50, 0xD0, 0x05, 0x61, 0x07]);
        chip8.tick().unwrap();
        chip8.tick().unwrap();
        chip8.tick().unwrap();
        assert_eq!(chip8.v[1], 0);

        chip8.tick_timers();
        chip8.tick().unwrap();
        assert_eq!(chip8.v[1], 7);
    }

    #[test]
    fn keypress_maps_host_keys() {
        let mut chip8 = Chip8::new();

        chip8.keypress(PhysicalKey::Code(KeyCode::KeyV), true);
        assert!(chip8.keypad[0xF]);

        chip8.keypress(PhysicalKey::Code(KeyCode::KeyV), false);
        chip8.keypress(PhysicalKey::Code(KeyCode::F12), true);
        assert_eq!(chip8.keypad, [false; 16]);
    }

    #[test]
    fn draw_screen_scales_lit_pixels() {
        let mut chip8 = Chip8::new();
        chip8.display[1][2] = true;
        chip8.display[31][63] = true;

        let mut surface = RecordingSurface::default();
        chip8.draw_screen(&mut surface, NonZeroU32::new(15).unwrap());

        assert_eq!(
            surface.ops,
            [SurfaceOp::Fill(30, 15, 15, 15), SurfaceOp::Fill(945, 465, 15, 15)]
        );
    }

    #[test]
    fn recursive_call_overflows_on_seventeenth_call() {
        // 0x200: CALL 0x200
        let mut chip8 = with_program(&[0x22, 0x00]);
        for _ in 0..STACK_SIZE {
            chip8.tick().unwrap();
        }
        assert_eq!(chip8.stack.len(), 16);

        let err = chip8.tick().unwrap_err();
        assert!(matches!(err, Chip8Error::StackOverflow { depth: 16 }));
        assert_eq!(chip8.stack.len(), 16);
    }

    #[test]
    fn stack_overflow_stops_the_session() {
        let mut session = Session::new(DriverConfig::new(17, 1).unwrap());
        session.attach(Chip8::new()).unwrap();
        let mut host = MockHost::default();
        let rom = Rom::new(std::path::Path::new("recurse.ch8"), vec![0x22, 0x00]).unwrap();
        session.load(rom, &mut host).unwrap();

        let handle = session.pending_frame().unwrap();
        host.fire(handle);
        let err = session
            .on_frame(handle, &mut RecordingSurface::default(), &mut host)
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Halted(Chip8Error::StackOverflow { .. })
        ));
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(session.pending_frame(), None);
    }
}
