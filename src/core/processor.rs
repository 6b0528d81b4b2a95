use crate::consts;
use crate::core::instruction::Instruction;
use crate::core::{ram, rom};
use crate::error::{MachineError, Result};
use crate::external::{InputSource, OutputSink};
use crate::utils;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    RedrawScreen,
    Continue,
    /// The key-wait instruction found no key held; the same instruction runs
    /// again on the next step.
    Waiting,
}

pub struct Processor {
    pub stack: ram::Stack,
    pub registers: [u8; consts::REG_COUNT],
    pub idx_register: u16,
    pub pc: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub ram: ram::Ram,
    pub display_buffer: ram::DisplayBuffer,
    input: Arc<dyn InputSource>,
    output: Arc<dyn OutputSink>,
    rng: StdRng,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("pc", &format_args!("{:#05X}", self.pc))
            .field("registers", &self.registers)
            .field("idx_register", &format_args!("{:#06X}", self.idx_register))
            .field("stack", &self.stack)
            .field("delay_timer", &self.delay_timer)
            .field("sound_timer", &self.sound_timer)
            .finish_non_exhaustive()
    }
}

impl Processor {
    pub fn new(
        rom: &rom::Rom,
        input: Arc<dyn InputSource>,
        output: Arc<dyn OutputSink>,
    ) -> Result<Self> {
        Self::build(rom, input, output, StdRng::from_entropy())
    }

    /// Same as [`Processor::new`] but with a reproducible random stream.
    pub fn with_seed(
        rom: &rom::Rom,
        input: Arc<dyn InputSource>,
        output: Arc<dyn OutputSink>,
        seed: u64,
    ) -> Result<Self> {
        Self::build(rom, input, output, StdRng::seed_from_u64(seed))
    }

    fn build(
        rom: &rom::Rom,
        input: Arc<dyn InputSource>,
        output: Arc<dyn OutputSink>,
        rng: StdRng,
    ) -> Result<Self> {
        let mut processor = Processor {
            stack: ram::Stack::default(),
            registers: [0; consts::REG_COUNT],
            idx_register: 0,
            pc: consts::PROG_OFFSET as u16,
            delay_timer: 0,
            sound_timer: 0,
            ram: ram::Ram::default(),
            display_buffer: ram::DisplayBuffer::default(),
            input,
            output,
            rng,
        };
        processor.init_ram(rom, &consts::FONT_SET)?;
        debug!("loaded {} byte program at {:#05X}", rom.len(), processor.pc);
        Ok(processor)
    }

    fn init_ram(&mut self, rom: &rom::Rom, fonts: &[u8]) -> Result<()> {
        if rom.len() > consts::MAX_ROM_BYTES {
            return Err(MachineError::RomTooLarge {
                size: rom.len(),
                max: consts::MAX_ROM_BYTES,
            });
        }
        self.ram.load(consts::FONT_OFFSET, fonts)?;
        self.ram.load(consts::PROG_OFFSET, &rom.buffer)
    }

    fn fetch(&self) -> Result<u16> {
        let pc = self.pc as usize;
        if pc + consts::OP_CODE_BYTES > consts::RAM_BYTES {
            return Err(MachineError::PcOutOfRange { pc: self.pc });
        }
        Ok(utils::join_word(self.ram.buffer[pc], self.ram.buffer[pc + 1]))
    }

    fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.output.beep();
            self.sound_timer -= 1;
        }
    }

    fn advance(&mut self) {
        self.pc = self.pc.wrapping_add(consts::OP_CODE_BYTES as u16);
    }

    // the skip is on top of the normal advance
    fn skip_if(&mut self, condition: bool) {
        self.advance();
        if condition {
            self.advance();
        }
    }

    /// Runs exactly one instruction. Timers tick once per call, after the
    /// word has been fetched and decoded and before it executes, including
    /// calls that spin on a pending key wait. A step that fails to fetch or
    /// decode changes nothing.
    pub fn step(&mut self) -> Result<CycleStatus> {
        let word = self.fetch()?;
        let instr =
            Instruction::decode(word).ok_or(MachineError::UnknownOpcode { word, pc: self.pc })?;
        trace!("{:03X}: {:04X}  {}", self.pc, word, instr);
        self.tick_timers();
        self.execute(instr)
    }

    fn execute(&mut self, instr: Instruction) -> Result<CycleStatus> {
        use Instruction::*;

        match instr {
            // Clears screen
            ClearScreen => {
                self.display_buffer.clear();
                self.output.draw(&self.display_buffer.buffer);
                self.advance();
                return Ok(CycleStatus::RedrawScreen);
            }

            // Draw on display
            Draw { x, y, n } => {
                let x_coord = self.registers[x as usize] as usize;
                let y_coord = self.registers[y as usize] as usize;
                let sprite_vals = self.ram.slice(self.idx_register as usize, n as usize)?;
                let mut collided = false;
                for (row, &sprite_row) in sprite_vals.iter().enumerate() {
                    for shift_pos in 0..consts::SPRITE_WIDTH {
                        if sprite_row & (0x80 >> shift_pos) == 0 {
                            continue;
                        }
                        let (px, py) = utils::wrap_coords(x_coord + shift_pos, y_coord + row);
                        collided |= self.display_buffer.flip(px, py);
                    }
                }
                self.registers[consts::FLAG_REG] = if collided {
                    consts::COLLISION_FLAG
                } else {
                    0
                };
                self.output.draw(&self.display_buffer.buffer);
                self.advance();
                return Ok(CycleStatus::RedrawScreen);
            }

            // Jumps
            Jump { nnn } => {
                self.pc = nnn;
            }
            JumpOffset { nnn } => {
                self.pc = nnn.wrapping_add(self.registers[0] as u16);
            }

            // Subroutines: enter and exit. The stack holds the call site, so
            // returning lands on the instruction after it.
            Call { nnn } => {
                self.stack.push(self.pc, self.pc)?;
                self.pc = nnn;
            }
            Return => {
                self.pc = self.stack.pop(self.pc)?;
                self.advance();
            }

            // Conditional skips
            SkipEqImm { x, nn } => {
                self.skip_if(self.registers[x as usize] == nn);
            }
            SkipNeImm { x, nn } => {
                self.skip_if(self.registers[x as usize] != nn);
            }
            SkipEqReg { x, y } => {
                self.skip_if(self.registers[x as usize] == self.registers[y as usize]);
            }
            SkipNeReg { x, y } => {
                self.skip_if(self.registers[x as usize] != self.registers[y as usize]);
            }

            // Set register
            LoadImm { x, nn } => {
                self.registers[x as usize] = nn;
                self.advance();
            }
            Move { x, y } => {
                self.registers[x as usize] = self.registers[y as usize];
                self.advance();
            }
            LoadIndex { nnn } => {
                self.idx_register = nnn;
                self.advance();
            }

            // Add/subtract instructions; VF is written last
            AddImm { x, nn } => {
                self.registers[x as usize] = self.registers[x as usize].wrapping_add(nn);
                self.advance();
            }
            AddReg { x, y } => {
                let (sum, carry) =
                    self.registers[x as usize].overflowing_add(self.registers[y as usize]);
                self.registers[x as usize] = sum;
                self.registers[consts::FLAG_REG] = carry as u8;
                self.advance();
            }
            SubReg { x, y } => {
                let (vx, vy) = (self.registers[x as usize], self.registers[y as usize]);
                self.registers[x as usize] = vx.wrapping_sub(vy);
                self.registers[consts::FLAG_REG] = (vx >= vy) as u8;
                self.advance();
            }
            SubReverse { x, y } => {
                let (vx, vy) = (self.registers[x as usize], self.registers[y as usize]);
                self.registers[x as usize] = vy.wrapping_sub(vx);
                self.registers[consts::FLAG_REG] = (vy >= vx) as u8;
                self.advance();
            }

            // Logical instructions
            Or { x, y } => {
                self.registers[x as usize] |= self.registers[y as usize];
                self.advance();
            }
            And { x, y } => {
                self.registers[x as usize] &= self.registers[y as usize];
                self.advance();
            }
            Xor { x, y } => {
                self.registers[x as usize] ^= self.registers[y as usize];
                self.advance();
            }

            // Shifting instructions. The left shift leaves the raw masked bit
            // in VF (0x80), not 1.
            ShiftRight { x } => {
                let vx = self.registers[x as usize];
                self.registers[x as usize] = vx >> 1;
                self.registers[consts::FLAG_REG] = vx & 0b0000_0001;
                self.advance();
            }
            ShiftLeft { x } => {
                let vx = self.registers[x as usize];
                self.registers[x as usize] = vx << 1;
                self.registers[consts::FLAG_REG] = vx & 0b1000_0000;
                self.advance();
            }

            // Generate randomness
            Random { x, nn } => {
                let rand_val: u8 = self.rng.gen();
                self.registers[x as usize] = nn & rand_val;
                self.advance();
            }

            // Skip on keypress
            SkipKey { x } => {
                let pressed = self.input.pressed_key();
                self.skip_if(pressed == Some(self.registers[x as usize]));
            }
            SkipNoKey { x } => {
                let pressed = self.input.pressed_key();
                self.skip_if(pressed != Some(self.registers[x as usize]));
            }

            // Halt till keyboard interrupt
            WaitKey { x } => match self.input.pressed_key() {
                Some(key) => {
                    self.registers[x as usize] = key;
                    self.advance();
                }
                None => return Ok(CycleStatus::Waiting),
            },

            // Change timers (delay/sound)
            LoadDelay { x } => {
                self.registers[x as usize] = self.delay_timer;
                self.advance();
            }
            SetDelay { x } => {
                self.delay_timer = self.registers[x as usize];
                self.advance();
            }
            SetSound { x } => {
                self.sound_timer = self.registers[x as usize];
                self.advance();
            }

            // Update index register
            AddIndex { x } => {
                self.idx_register = self
                    .idx_register
                    .wrapping_add(self.registers[x as usize] as u16);
                self.advance();
            }

            // Point index to font character
            LoadGlyph { x } => {
                let glyph = (self.registers[x as usize] & 0x0F) as usize;
                self.idx_register = (consts::FONT_OFFSET + glyph * consts::FONT_GLYPH_BYTES) as u16;
                self.advance();
            }

            // Binary byte to decimal string representation conversion
            StoreBcd { x } => {
                let num = self.registers[x as usize];
                let digits = self.ram.slice_mut(self.idx_register as usize, 3)?;
                digits.copy_from_slice(&[num / 100, (num % 100) / 10, num % 10]);
                self.advance();
            }

            // Store and load memory; only the load moves the index register.
            // The whole block is bounds-checked before anything is copied.
            StoreRegs { x } => {
                let len = x as usize + 1;
                let block = self.ram.slice_mut(self.idx_register as usize, len)?;
                block.copy_from_slice(&self.registers[..len]);
                self.advance();
            }
            LoadRegs { x } => {
                let len = x as usize + 1;
                let block = self.ram.slice(self.idx_register as usize, len)?;
                self.registers[..len].copy_from_slice(block);
                self.idx_register = self.idx_register.wrapping_add(len as u16);
                self.advance();
            }
        }
        Ok(CycleStatus::Continue)
    }
}
