use super::chip8::STACK_SIZE;
use super::{AluOp, Chip8, Chip8Error, Chip8Result, DISPLAY_X, DISPLAY_Y, FONT_START_ADDRESS, Opcode};
use crate::u4;

impl Chip8 {
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<Chip8Result, Chip8Error> {
        self.pc = self.pc.wrapping_add(2);

        match opcode {
            Opcode::ClearDisplay => {
                self.display = [[false; DISPLAY_X]; DISPLAY_Y];
            }
            Opcode::Return => {
                self.pc = self.stack.pop().ok_or(Chip8Error::StackUnderflow)?;
            }
            Opcode::Jump { nnn } => self.pc = nnn,
            Opcode::JumpWithOffset { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into());
            }
            Opcode::Call { nnn } => {
                if self.stack.len() == STACK_SIZE {
                    return Err(Chip8Error::StackOverflow { depth: STACK_SIZE });
                }
                self.stack.push(self.pc);
                self.pc = nnn;
            }
            Opcode::SkipRegEqualImm { x, nn } => self.skip_if(self.v[x] == nn),
            Opcode::SkipRegNotEqualImm { x, nn } => self.skip_if(self.v[x] != nn),
            Opcode::SkipRegEqualReg { x, y } => self.skip_if(self.v[x] == self.v[y]),
            Opcode::SkipRegNotEqualReg { x, y } => self.skip_if(self.v[x] != self.v[y]),
            Opcode::SetRegImm { x, nn } => self.v[x] = nn,
            Opcode::AddRegImm { x, nn } => self.v[x] = self.v[x].wrapping_add(nn),
            Opcode::Alu { x, y, op } => self.execute_alu(x, y, op),
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = rand::random();
                self.v[x] = rand_byte & nn;
            }
            Opcode::SetIndexImm { nnn } => self.i = nnn,
            Opcode::AddIndexReg { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());
            }
            Opcode::Draw { x, y, n } => return self.execute_draw(x, y, n),
            Opcode::SkipIfPressed { x } => {
                self.skip_if(self.keypad[u4::truncate(self.v[x])]);
            }
            Opcode::SkipIfNotPressed { x } => {
                self.skip_if(!self.keypad[u4::truncate(self.v[x])]);
            }
            Opcode::WaitForKey { x } => return Ok(self.execute_wait_for_key(x)),
            Opcode::ReadDelayTimer { x } => self.v[x] = self.delay_timer,
            Opcode::SetDelayTimer { x } => self.delay_timer = self.v[x],
            Opcode::SetSoundTimer { x } => self.sound_timer = self.v[x],
            Opcode::FontChar { x } => {
                let digit = self.v[x] & 0x0F;
                self.i = FONT_START_ADDRESS as u16 + digit as u16 * 5;
            }
            Opcode::Bcd { x } => {
                let value = self.v[x];
                *self.mem_get(self.i)? = value / 100;
                *self.mem_get(self.i.wrapping_add(1))? = (value / 10) % 10;
                *self.mem_get(self.i.wrapping_add(2))? = value % 10;
            }
            Opcode::StoreRegs { x } => {
                for reg in 0..=usize::from(x) {
                    *self.mem_get(self.i)? = self.v[reg];
                    self.i = self.i.wrapping_add(1);
                }
            }
            Opcode::LoadRegs { x } => {
                for reg in 0..=usize::from(x) {
                    self.v[reg] = *self.mem_get(self.i)?;
                    self.i = self.i.wrapping_add(1);
                }
            }
        }

        Ok(Chip8Result::Continue)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn execute_alu(&mut self, x: u4, y: u4, op: AluOp) {
        let (vx, vy) = (self.v[x], self.v[y]);

        let (result, flag) = match op {
            AluOp::Set => (vy, None),
            // The logic ops reset VF like the original COSMAC interpreter
            AluOp::Or => (vx | vy, Some(0)),
            AluOp::And => (vx & vy, Some(0)),
            AluOp::Xor => (vx ^ vy, Some(0)),
            AluOp::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(carry as u8))
            }
            AluOp::Sub => {
                let (res, borrow) = vx.overflowing_sub(vy);
                (res, Some(!borrow as u8))
            }
            AluOp::SubReverse => {
                let (res, borrow) = vy.overflowing_sub(vx);
                (res, Some(!borrow as u8))
            }
            AluOp::ShiftRight => (vy >> 1, Some(vy & 1)),
            AluOp::ShiftLeft => (vy << 1, Some(vy >> 7)),
        };

        self.v[x] = result;
        if let Some(flag) = flag {
            self.v[0xF] = flag;
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Result<Chip8Result, Chip8Error> {
        let x_pos = self.v[x] as usize % DISPLAY_X;
        let y_pos = self.v[y] as usize % DISPLAY_Y;

        // Sprites clip at the screen edges instead of wrapping
        let row_count = usize::from(n).min(DISPLAY_Y - y_pos);
        let col_count = 8usize.min(DISPLAY_X - x_pos);

        let mut any_erased = false;
        for row in 0..row_count {
            let sprite_byte = *self.mem_get(self.i.wrapping_add(row as u16))?;

            for col in 0..col_count {
                if sprite_byte & (0x80 >> col) == 0 {
                    continue;
                }

                let pixel = &mut self.display[y_pos + row][x_pos + col];
                *pixel ^= true;
                any_erased |= !*pixel;
            }
        }

        self.v[0xF] = any_erased as u8;
        Ok(Chip8Result::WaitForNextFrame)
    }

    fn execute_wait_for_key(&mut self, x: u4) -> Chip8Result {
        if let Some(key) = self.wait_release_key
            && !self.keypad[key]
        {
            self.v[x] = key.get();
            self.wait_release_key = None;
            return Chip8Result::Continue;
        }

        if self.wait_release_key.is_none() {
            self.wait_release_key = u4::all().find(|&key| self.keypad[key]);
        }

        // Repeat this instruction until the key is released
        self.pc = self.pc.wrapping_sub(2);
        Chip8Result::WaitForNextFrame
    }
}
