use crate::u4;

/// Decoded CHIP-8 instruction.
///
/// Operand names follow the usual notation: `x`/`y` select registers, `n` is a
/// 4-bit immediate, `nn` an 8-bit immediate and `nnn` a 12-bit address.
pub enum Opcode {
    /// 00E0
    ClearDisplay,
    /// 00EE
    Return,
    /// 1nnn
    Jump { nnn: u16 },
    /// Bnnn, jumps to nnn + V0
    JumpWithOffset { nnn: u16 },
    /// 2nnn
    Call { nnn: u16 },

    /// 3xnn
    SkipRegEqualImm { x: u4, nn: u8 },
    /// 4xnn
    SkipRegNotEqualImm { x: u4, nn: u8 },
    /// 5xy0
    SkipRegEqualReg { x: u4, y: u4 },
    /// 9xy0
    SkipRegNotEqualReg { x: u4, y: u4 },

    /// 6xnn
    SetRegImm { x: u4, nn: u8 },
    /// 7xnn, no carry
    AddRegImm { x: u4, nn: u8 },
    /// 8xyN
    Alu { x: u4, y: u4, op: AluOp },
    /// Cxnn
    Random { x: u4, nn: u8 },

    /// Annn
    SetIndexImm { nnn: u16 },
    /// Fx1E
    AddIndexReg { x: u4 },

    /// Dxyn
    Draw { x: u4, y: u4, n: u4 },

    /// Ex9E
    SkipIfPressed { x: u4 },
    /// ExA1
    SkipIfNotPressed { x: u4 },
    /// Fx0A, completes on key release
    WaitForKey { x: u4 },

    /// Fx07
    ReadDelayTimer { x: u4 },
    /// Fx15
    SetDelayTimer { x: u4 },
    /// Fx18
    SetSoundTimer { x: u4 },

    /// Fx29
    FontChar { x: u4 },
    /// Fx33
    Bcd { x: u4 },
    /// Fx55
    StoreRegs { x: u4 },
    /// Fx65
    LoadRegs { x: u4 },
}

/// Operations of the 8xyN group.
pub enum AluOp {
    Set,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

impl Opcode {
    /// Decodes a raw big-endian instruction word. Returns `None` for words
    /// that are not part of the instruction set.
    pub fn decode(word: u16) -> Option<Self> {
        let [hi, lo] = word.to_be_bytes();
        let (a, b, c, d) = (hi >> 4, hi & 0x0F, lo >> 4, lo & 0x0F);

        let x = u4::new(b);
        let y = u4::new(c);
        let nn = lo;
        let nnn = word & 0x0FFF;

        let opcode = match (a, b, c, d) {
            (0x0, 0x0, 0xE, 0x0) => Opcode::ClearDisplay,
            (0x0, 0x0, 0xE, 0xE) => Opcode::Return,
            (0x1, ..) => Opcode::Jump { nnn },
            (0x2, ..) => Opcode::Call { nnn },
            (0x3, ..) => Opcode::SkipRegEqualImm { x, nn },
            (0x4, ..) => Opcode::SkipRegNotEqualImm { x, nn },
            (0x5, _, _, 0x0) => Opcode::SkipRegEqualReg { x, y },
            (0x6, ..) => Opcode::SetRegImm { x, nn },
            (0x7, ..) => Opcode::AddRegImm { x, nn },
            (0x8, ..) => Opcode::Alu {
                x,
                y,
                op: AluOp::decode(d)?,
            },
            (0x9, _, _, 0x0) => Opcode::SkipRegNotEqualReg { x, y },
            (0xA, ..) => Opcode::SetIndexImm { nnn },
            (0xB, ..) => Opcode::JumpWithOffset { nnn },
            (0xC, ..) => Opcode::Random { x, nn },
            (0xD, ..) => Opcode::Draw { x, y, n: u4::new(d) },
            (0xE, _, 0x9, 0xE) => Opcode::SkipIfPressed { x },
            (0xE, _, 0xA, 0x1) => Opcode::SkipIfNotPressed { x },
            (0xF, _, 0x0, 0x7) => Opcode::ReadDelayTimer { x },
            (0xF, _, 0x0, 0xA) => Opcode::WaitForKey { x },
            (0xF, _, 0x1, 0x5) => Opcode::SetDelayTimer { x },
            (0xF, _, 0x1, 0x8) => Opcode::SetSoundTimer { x },
            (0xF, _, 0x1, 0xE) => Opcode::AddIndexReg { x },
            (0xF, _, 0x2, 0x9) => Opcode::FontChar { x },
            (0xF, _, 0x3, 0x3) => Opcode::Bcd { x },
            (0xF, _, 0x5, 0x5) => Opcode::StoreRegs { x },
            (0xF, _, 0x6, 0x5) => Opcode::LoadRegs { x },
            _ => return None,
        };

        Some(opcode)
    }
}

impl AluOp {
    fn decode(n: u8) -> Option<Self> {
        Some(match n {
            0x0 => AluOp::Set,
            0x1 => AluOp::Or,
            0x2 => AluOp::And,
            0x3 => AluOp::Xor,
            0x4 => AluOp::Add,
            0x5 => AluOp::Sub,
            0x6 => AluOp::ShiftRight,
            0x7 => AluOp::SubReverse,
            0xE => AluOp::ShiftLeft,
            _ => return None,
        })
    }
}
