//! Numeric core for handheld gamma-ray spectrum analysis.
//!
//! Channel counts pass through calibration, efficiency compensation,
//! energy-adaptive smoothing and normalization before optional background
//! subtraction and peak detection. Every stage is a pure function; the
//! `SpectrumPipeline` driver only adds memoization on top.

pub mod device_interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{PipelineConfig, PipelineError, PipelineResult, Spectrum};
