use std::io::BufRead;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::consts;
use crate::error::{MachineError, Result};

/// Polled by the processor for the key currently held down, if any. Written
/// from an input thread and read from the drive loop's thread, so
/// implementations carry their own synchronisation.
pub trait InputSource: Send + Sync {
    fn pressed_key(&self) -> Option<u8>;
}

const NO_KEY: u8 = 0xFF;

/// A hex keypad that holds at most one key. Pressing a second key while one
/// is held is ignored until the first one is released.
#[derive(Debug)]
pub struct Keypad {
    held: AtomicU8,
}

impl Default for Keypad {
    fn default() -> Self {
        Keypad {
            held: AtomicU8::new(NO_KEY),
        }
    }
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, key: u8) -> Result<()> {
        if key >= consts::KEY_COUNT {
            warn!("rejecting press of key {:#04X}", key);
            return Err(MachineError::InvalidKey(key));
        }
        let _ = self
            .held
            .compare_exchange(NO_KEY, key, Ordering::AcqRel, Ordering::Acquire);
        Ok(())
    }

    /// Releasing a key that isn't the held one does nothing.
    pub fn release(&self, key: u8) {
        let _ = self
            .held
            .compare_exchange(key, NO_KEY, Ordering::AcqRel, Ordering::Acquire);
    }
}

impl InputSource for Keypad {
    fn pressed_key(&self) -> Option<u8> {
        match self.held.load(Ordering::Acquire) {
            NO_KEY => None,
            key => Some(key),
        }
    }
}

/// Maps the left-hand block of a qwerty keyboard onto the hex keypad:
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r  ->  4 5 6 D
/// a s d f      7 8 9 E
/// z x c v      A 0 B F
/// ```
pub fn qwerty_key(c: char) -> Option<u8> {
    match c.to_ascii_lowercase() {
        '1' => Some(0x1),
        '2' => Some(0x2),
        '3' => Some(0x3),
        '4' => Some(0xC),
        'q' => Some(0x4),
        'w' => Some(0x5),
        'e' => Some(0x6),
        'r' => Some(0xD),
        'a' => Some(0x7),
        's' => Some(0x8),
        'd' => Some(0x9),
        'f' => Some(0xE),
        'z' => Some(0xA),
        'x' => Some(0x0),
        'c' => Some(0xB),
        'v' => Some(0xF),
        _ => None,
    }
}

/// Plays typed characters into the keypad: every mapped character is pressed,
/// held for `hold`, then released. Whitespace pauses for one `hold`; anything
/// else is skipped with a warning. Returns how many keys were pressed.
pub fn feed_keys(reader: impl BufRead, keypad: &Keypad, hold: Duration) -> Result<usize> {
    let mut pressed = 0;
    for line in reader.lines() {
        let line = line.map_err(MachineError::InputUnreadable)?;
        for c in line.chars() {
            if c.is_whitespace() {
                thread::sleep(hold);
                continue;
            }
            let Some(key) = qwerty_key(c) else {
                warn!("no keypad mapping for {:?}", c);
                continue;
            };
            debug!("key {:X} down", key);
            keypad.press(key)?;
            thread::sleep(hold);
            keypad.release(key);
            pressed += 1;
        }
    }
    Ok(pressed)
}
