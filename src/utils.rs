use crate::consts;

/// Splits an instruction word into its four nibbles, most significant first.
pub fn nibble_split(word: u16) -> (u8, u8, u8, u8) {
    (
        ((word & 0xF000) >> 12) as u8,
        ((word & 0x0F00) >> 8) as u8,
        ((word & 0x00F0) >> 4) as u8,
        (word & 0x000F) as u8,
    )
}

/// Joins two bytes fetched from memory into an instruction word, big-endian.
pub fn join_word(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | (lo as u16)
}

/// Wraps a sprite coordinate around the screen edges.
pub fn wrap_coords(x: usize, y: usize) -> (usize, usize) {
    (x % consts::DISPL_WIDTH, y % consts::DISPL_HEIGHT)
}
