pub mod input;
pub mod output;

pub use input::{InputSource, Keypad};
pub use output::{FrameSink, NullSink, OutputSink};
