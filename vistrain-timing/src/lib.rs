pub mod countdown;
pub mod timer;

pub use countdown::{Countdown, Stopwatch};
pub use timer::{FrameStatistics, HighPrecisionTimer, ManualTimer, Timer};
