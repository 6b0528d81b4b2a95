use crate::consts;
use crate::error::{MachineError, Result};
use crate::utils;

#[derive(Debug)]
pub struct Ram {
    pub buffer: [u8; consts::RAM_BYTES],
}

impl Default for Ram {
    fn default() -> Self {
        Ram {
            buffer: [0; consts::RAM_BYTES],
        }
    }
}

impl Ram {
    /// Borrows `len` bytes starting at `address`; fails if any of them falls
    /// past the end of memory.
    pub fn slice(&self, address: usize, len: usize) -> Result<&[u8]> {
        let end = address + len;
        if end > consts::RAM_BYTES {
            return Err(MachineError::MemoryOutOfBounds { address: end - 1 });
        }
        Ok(&self.buffer[address..end])
    }

    /// Mutable counterpart of [`Ram::slice`]. The whole range is checked
    /// before anything can be written through it.
    pub fn slice_mut(&mut self, address: usize, len: usize) -> Result<&mut [u8]> {
        let end = address + len;
        if end > consts::RAM_BYTES {
            return Err(MachineError::MemoryOutOfBounds { address: end - 1 });
        }
        Ok(&mut self.buffer[address..end])
    }

    pub fn load(&mut self, address: usize, data: &[u8]) -> Result<()> {
        let end = address + data.len();
        if end > consts::RAM_BYTES {
            return Err(MachineError::MemoryOutOfBounds { address: end - 1 });
        }
        self.buffer[address..end].copy_from_slice(data);
        Ok(())
    }
}

/// 64x32 cells, row-major, each cell either `PIXEL_OFF` or `PIXEL_ON`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    pub buffer: [u8; consts::DISPL_BYTES],
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        DisplayBuffer {
            buffer: [consts::PIXEL_OFF; consts::DISPL_BYTES],
        }
    }
}

impl DisplayBuffer {
    pub fn clear(&mut self) {
        self.buffer.fill(consts::PIXEL_OFF);
    }

    /// Coordinates wrap around the screen edges.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        let (x, y) = utils::wrap_coords(x, y);
        self.buffer[y * consts::DISPL_WIDTH + x]
    }

    /// XORs one cell with a lit pixel, wrapping coordinates like [`get`].
    /// Returns true when the cell was lit before, i.e. the flip turned it off.
    ///
    /// [`get`]: DisplayBuffer::get
    pub fn flip(&mut self, x: usize, y: usize) -> bool {
        let (x, y) = utils::wrap_coords(x, y);
        let cell = &mut self.buffer[y * consts::DISPL_WIDTH + x];
        let collided = *cell == consts::PIXEL_ON;
        *cell ^= consts::PIXEL_ON;
        collided
    }
}

#[derive(Debug, Default)]
pub struct Stack {
    pub slots: [u16; consts::STACK_SIZE],
    pub depth: usize,
}

impl Stack {
    pub fn push(&mut self, value: u16, pc: u16) -> Result<()> {
        if self.depth >= consts::STACK_SIZE {
            return Err(MachineError::StackOverflow { pc });
        }
        self.slots[self.depth] = value;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self, pc: u16) -> Result<u16> {
        if self.depth == 0 {
            return Err(MachineError::StackUnderflow { pc });
        }
        self.depth -= 1;
        Ok(self.slots[self.depth])
    }
}
