pub mod peak;
pub mod recording;

pub use peak::PeakRecord;
pub use recording::{BackgroundRecording, SpectrumRecording};
