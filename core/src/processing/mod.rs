pub mod background;
pub mod cache;
pub mod calibration;
pub mod efficiency;
pub mod normalize;
pub mod peaks;
pub mod pipeline;
pub mod smoothing;

pub use background::subtract_background;
pub use cache::{Fingerprint, StageCache};
pub use calibration::{calibrate, CalibrationAdvisory, CalibrationCoefficients};
pub use efficiency::compensate;
pub use normalize::normalize;
pub use peaks::{detect_peak_records, detect_peaks};
pub use pipeline::{AnalysisOutput, AnalysisRequest, CurveSet, SpectrumPipeline, SubtractedCurves};
pub use smoothing::smooth;
