use std::fmt;

use crate::utils;

/// One decoded instruction word. `x`/`y` are register indices, `nn` an 8-bit
/// immediate and `nnn` a 12-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,
    Return,
    Jump { nnn: u16 },
    Call { nnn: u16 },
    SkipEqImm { x: u8, nn: u8 },
    SkipNeImm { x: u8, nn: u8 },
    SkipEqReg { x: u8, y: u8 },
    LoadImm { x: u8, nn: u8 },
    AddImm { x: u8, nn: u8 },
    Move { x: u8, y: u8 },
    Or { x: u8, y: u8 },
    And { x: u8, y: u8 },
    Xor { x: u8, y: u8 },
    AddReg { x: u8, y: u8 },
    SubReg { x: u8, y: u8 },
    ShiftRight { x: u8 },
    SubReverse { x: u8, y: u8 },
    ShiftLeft { x: u8 },
    SkipNeReg { x: u8, y: u8 },
    LoadIndex { nnn: u16 },
    JumpOffset { nnn: u16 },
    Random { x: u8, nn: u8 },
    Draw { x: u8, y: u8, n: u8 },
    SkipKey { x: u8 },
    SkipNoKey { x: u8 },
    LoadDelay { x: u8 },
    WaitKey { x: u8 },
    SetDelay { x: u8 },
    SetSound { x: u8 },
    AddIndex { x: u8 },
    LoadGlyph { x: u8 },
    StoreBcd { x: u8 },
    StoreRegs { x: u8 },
    LoadRegs { x: u8 },
}

impl Instruction {
    /// Decodes a word by its top nibble, then by the low nibble or low byte
    /// where a family needs it. Returns `None` for anything unrecognised,
    /// including the `0NNN` machine-routine call.
    pub fn decode(word: u16) -> Option<Self> {
        use Instruction::*;

        let (opcode, x, y, n) = utils::nibble_split(word);
        let nn = (word & 0x00FF) as u8;
        let nnn = word & 0x0FFF;

        let instr = match (opcode, x, y, n) {
            (0, 0, 0xE, 0) => ClearScreen,
            (0, 0, 0xE, 0xE) => Return,
            (1, _, _, _) => Jump { nnn },
            (2, _, _, _) => Call { nnn },
            (3, _, _, _) => SkipEqImm { x, nn },
            (4, _, _, _) => SkipNeImm { x, nn },
            (5, _, _, 0) => SkipEqReg { x, y },
            (6, _, _, _) => LoadImm { x, nn },
            (7, _, _, _) => AddImm { x, nn },
            (8, _, _, 0) => Move { x, y },
            (8, _, _, 1) => Or { x, y },
            (8, _, _, 2) => And { x, y },
            (8, _, _, 3) => Xor { x, y },
            (8, _, _, 4) => AddReg { x, y },
            (8, _, _, 5) => SubReg { x, y },
            (8, _, _, 6) => ShiftRight { x },
            (8, _, _, 7) => SubReverse { x, y },
            (8, _, _, 0xE) => ShiftLeft { x },
            (9, _, _, 0) => SkipNeReg { x, y },
            (0xA, _, _, _) => LoadIndex { nnn },
            (0xB, _, _, _) => JumpOffset { nnn },
            (0xC, _, _, _) => Random { x, nn },
            (0xD, _, _, _) => Draw { x, y, n },
            (0xE, _, 9, 0xE) => SkipKey { x },
            (0xE, _, 0xA, 1) => SkipNoKey { x },
            (0xF, _, 0, 7) => LoadDelay { x },
            (0xF, _, 0, 0xA) => WaitKey { x },
            (0xF, _, 1, 5) => SetDelay { x },
            (0xF, _, 1, 8) => SetSound { x },
            (0xF, _, 1, 0xE) => AddIndex { x },
            (0xF, _, 2, 9) => LoadGlyph { x },
            (0xF, _, 3, 3) => StoreBcd { x },
            (0xF, _, 5, 5) => StoreRegs { x },
            (0xF, _, 6, 5) => LoadRegs { x },
            (_, _, _, _) => return None,
        };
        Some(instr)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { nnn } => write!(f, "JP {:#05X}", nnn),
            Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            SkipEqImm { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            SkipNeImm { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            SubReg { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { nnn } => write!(f, "LD I, {:#05X}", nnn),
            JumpOffset { nnn } => write!(f, "JP V0, {:#05X}", nnn),
            Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKey { x } => write!(f, "SKP V{:X}", x),
            SkipNoKey { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegs { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegs { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_families() {
        assert_eq!(Instruction::decode(0x00E0), Some(Instruction::ClearScreen));
        assert_eq!(Instruction::decode(0x00EE), Some(Instruction::Return));
        assert_eq!(
            Instruction::decode(0x1ABC),
            Some(Instruction::Jump { nnn: 0xABC })
        );
        assert_eq!(
            Instruction::decode(0x8AB4),
            Some(Instruction::AddReg { x: 0xA, y: 0xB })
        );
        assert_eq!(
            Instruction::decode(0xD125),
            Some(Instruction::Draw { x: 1, y: 2, n: 5 })
        );
        assert_eq!(
            Instruction::decode(0xF365),
            Some(Instruction::LoadRegs { x: 3 })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_selectors() {
        // machine routine call
        assert_eq!(Instruction::decode(0x0123), None);
        assert_eq!(Instruction::decode(0x5121), None);
        assert_eq!(Instruction::decode(0x8128), None);
        assert_eq!(Instruction::decode(0x912F), None);
        assert_eq!(Instruction::decode(0xE19F), None);
        assert_eq!(Instruction::decode(0xF1FF), None);
    }

    #[test]
    fn test_display_mnemonics() {
        assert_eq!(Instruction::ClearScreen.to_string(), "CLS");
        assert_eq!(
            Instruction::decode(0x2345).unwrap().to_string(),
            "CALL 0x345"
        );
        assert_eq!(
            Instruction::decode(0x6A0F).unwrap().to_string(),
            "LD VA, 0x0F"
        );
        assert_eq!(
            Instruction::decode(0xD015).unwrap().to_string(),
            "DRW V0, V1, 5"
        );
        assert_eq!(Instruction::decode(0xF20A).unwrap().to_string(), "LD V2, K");
    }
}
