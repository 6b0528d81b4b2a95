use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use log::trace;

use crate::consts;

pub type Frame = [u8; consts::DISPL_BYTES];

/// Receives every frame the processor produces and every beep. Calls arrive
/// on the drive loop's thread; marshalling onto a UI thread is up to the sink.
pub trait OutputSink: Send + Sync {
    fn draw(&self, buffer: &Frame);
    fn beep(&self);
}

/// Discards output.
#[derive(Debug, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn draw(&self, _buffer: &Frame) {
        trace!("frame dropped");
    }

    fn beep(&self) {
        trace!("beep dropped");
    }
}

/// Keeps the most recent frame and counts draws and beeps.
#[derive(Debug)]
pub struct FrameSink {
    frame: Mutex<Frame>,
    draws: AtomicU64,
    beeps: AtomicU64,
}

impl Default for FrameSink {
    fn default() -> Self {
        FrameSink {
            frame: Mutex::new([consts::PIXEL_OFF; consts::DISPL_BYTES]),
            draws: AtomicU64::new(0),
            beeps: AtomicU64::new(0),
        }
    }
}

impl FrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Frame {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn draw_count(&self) -> u64 {
        self.draws.load(Ordering::Relaxed)
    }

    pub fn beep_count(&self) -> u64 {
        self.beeps.load(Ordering::Relaxed)
    }
}

impl OutputSink for FrameSink {
    fn draw(&self, buffer: &Frame) {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = *buffer;
        self.draws.fetch_add(1, Ordering::Relaxed);
    }

    fn beep(&self) {
        self.beeps.fetch_add(1, Ordering::Relaxed);
    }
}

/// Renders a frame as text, one line per row: `#` for lit cells, `.` for
/// dark ones and `?` for anything that isn't a valid pixel value.
pub fn render_ascii(buffer: &Frame) -> String {
    let mut out = String::with_capacity((consts::DISPL_WIDTH + 1) * consts::DISPL_HEIGHT);
    for row in buffer.chunks(consts::DISPL_WIDTH) {
        for &cell in row {
            out.push(match cell {
                consts::PIXEL_OFF => '.',
                consts::PIXEL_ON => '#',
                _ => '?',
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_sink_records() {
        let sink = FrameSink::new();
        let mut frame = [consts::PIXEL_OFF; consts::DISPL_BYTES];
        frame[5] = consts::PIXEL_ON;
        sink.draw(&frame);
        sink.beep();
        sink.beep();
        assert_eq!(sink.frame()[5], consts::PIXEL_ON);
        assert_eq!(sink.draw_count(), 1);
        assert_eq!(sink.beep_count(), 2);
    }

    #[test]
    fn test_null_sink_drives_processor() -> crate::error::Result<()> {
        use crate::core::processor::{CycleStatus, Processor};
        use crate::core::rom::Rom;
        use crate::external::Keypad;
        use std::sync::Arc;

        let rom = Rom::from_bytes(&[0x00, 0xE0])?;
        let mut processor = Processor::new(&rom, Arc::new(Keypad::new()), Arc::new(NullSink))?;
        assert_eq!(processor.step()?, CycleStatus::RedrawScreen);
        Ok(())
    }

    #[test]
    fn test_render_ascii() {
        let mut frame = [consts::PIXEL_OFF; consts::DISPL_BYTES];
        frame[0] = consts::PIXEL_ON;
        frame[consts::DISPL_WIDTH + 1] = 7;
        let text = render_ascii(&frame);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), consts::DISPL_HEIGHT);
        assert!(lines[0].starts_with("#."));
        assert!(lines[1].starts_with(".?"));
        assert_eq!(lines[31].len(), consts::DISPL_WIDTH);
    }
}
