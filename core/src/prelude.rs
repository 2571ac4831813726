use serde::{Deserialize, Serialize};

use crate::processing::calibration::{calibrate, CalibrationAdvisory, CalibrationCoefficients};

/// Calibrated channel counts as handed over by the recording layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub coefficients: CalibrationCoefficients,
    pub counts: Vec<u64>,
}

impl Spectrum {
    pub fn new(coefficients: CalibrationCoefficients, counts: Vec<u64>) -> Self {
        Self {
            coefficients,
            counts,
        }
    }

    /// Validates `raw_coefficients` exported by `device_model` before
    /// pairing them with `counts`.
    pub fn from_raw(
        raw_coefficients: &[f64],
        counts: Vec<u64>,
        device_model: &str,
    ) -> PipelineResult<(Self, Vec<CalibrationAdvisory>)> {
        let (coefficients, advisories) =
            CalibrationCoefficients::from_slice(raw_coefficients, device_model)?;
        Ok((Self::new(coefficients, counts), advisories))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn energies(&self) -> PipelineResult<Vec<f64>> {
        calibrate(&self.coefficients, self.counts.len())
    }

    pub fn counts_f64(&self) -> Vec<f64> {
        self.counts.iter().map(|&c| c as f64).collect()
    }
}

/// Window widths driving the energy-adaptive moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingParams {
    pub low_window: u32,
    pub high_window: u32,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            low_window: 3,
            high_window: 20,
        }
    }
}

/// Peak-picking thresholds as supplied by the caller.
///
/// `height_pct` and `prominence_pct` are whole percentages of the
/// normalized range; `distance` is measured in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    pub height_pct: u32,
    pub prominence_pct: u32,
    pub distance: usize,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            height_pct: 10,
            prominence_pct: 5,
            distance: 10,
        }
    }
}

impl PeakParams {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.height_pct > 100 {
            return Err(PipelineError::InvalidInput(format!(
                "peak height {}% exceeds 100%",
                self.height_pct
            )));
        }
        if self.prominence_pct > 100 {
            return Err(PipelineError::InvalidInput(format!(
                "peak prominence {}% exceeds 100%",
                self.prominence_pct
            )));
        }
        Ok(())
    }

    pub fn height(&self) -> f64 {
        f64::from(self.height_pct) / 100.0
    }

    pub fn prominence(&self) -> f64 {
        f64::from(self.prominence_pct) / 100.0
    }
}

/// Explicit configuration handed to every pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub smoothing: SmoothingParams,
    pub peaks: PeakParams,
    pub detect_peaks: bool,
    /// Keep the trailing channel, which the detector uses as an overflow bin.
    pub include_last_channel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingParams::default(),
            peaks: PeakParams::default(),
            detect_peaks: true,
            include_last_channel: false,
        }
    }
}

/// Common error type for pipeline stages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),
    #[error("division by zero: {0}")]
    DivisionByZero(String),
    #[error("length mismatch: {left} vs {right} samples")]
    LengthMismatch { left: usize, right: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

pub(crate) fn ensure_same_length(left: &[f64], right: &[f64]) -> PipelineResult<()> {
    if left.len() != right.len() {
        return Err(PipelineError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_from_raw_rejects_zero_coefficient() {
        let err = Spectrum::from_raw(&[0.0, 1.0, 0.0], vec![1, 2, 3], "RC-102").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidCalibration(_)));
    }

    #[test]
    fn deserialized_spectrum_is_validated() {
        let json = r#"{"coefficients": [0.0, 1.0, 0.0], "counts": [1, 2]}"#;
        let err = serde_json::from_str::<Spectrum>(json).unwrap_err();
        assert!(err.to_string().contains("invalid calibration"));

        let spectrum: Spectrum =
            serde_json::from_str(r#"{"coefficients": [1.5, 2.0, 0.5], "counts": [4, 0, 9]}"#)
                .unwrap();
        assert_eq!(spectrum.energies().unwrap(), vec![1.5, 4.0, 7.5]);
    }

    #[test]
    fn spectrum_energy_axis_matches_counts() {
        let (spectrum, advisories) =
            Spectrum::from_raw(&[1.5, 2.0, 0.5], vec![4, 0, 9], "RC-102").unwrap();
        assert!(advisories.is_empty());
        assert_eq!(spectrum.energies().unwrap(), vec![1.5, 4.0, 7.5]);
        assert_eq!(spectrum.counts_f64(), vec![4.0, 0.0, 9.0]);
    }

    #[test]
    fn peak_params_convert_percentages() {
        let params = PeakParams {
            height_pct: 25,
            prominence_pct: 100,
            distance: 0,
        };
        assert_eq!(params.height(), 0.25);
        assert_eq!(params.prominence(), 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn peak_params_reject_percentages_above_hundred() {
        let params = PeakParams {
            height_pct: 101,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn pipeline_config_fills_missing_fields() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"smoothing": {"high_window": 40}}"#).unwrap();
        assert_eq!(config.smoothing.low_window, 3);
        assert_eq!(config.smoothing.high_window, 40);
        assert!(config.detect_peaks);
        assert!(!config.include_last_channel);
    }
}
