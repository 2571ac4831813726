use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prelude::{PipelineError, PipelineResult};
use crate::telemetry::log::LogManager;

/// Plausible band for the calibration offset, in keV.
const OFFSET_FLOOR_KEV: f64 = -20.0;
const OFFSET_CEILING_KEV: f64 = 30.0;

/// Model whose factory calibration never carries a negative offset.
pub const STRICT_OFFSET_MODEL: &str = "RC-103G";

/// Quadratic channel-to-energy calibration `a0 + a1*i + a2*i^2`.
///
/// Only constructible through validation, so every instance has three
/// non-zero terms. Serialized as `[a0, a1, a2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 3]")]
pub struct CalibrationCoefficients {
    a0: f64,
    a1: f64,
    a2: f64,
}

/// Non-fatal observations made while validating calibration coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalibrationAdvisory {
    /// More than three coefficients were supplied; the rest were dropped.
    ExtraCoefficients(usize),
    /// Any negative offset on a model that should never have one.
    NegativeOffset(f64),
    OffsetBelowRange(f64),
    OffsetAboveRange(f64),
}

impl fmt::Display for CalibrationAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationAdvisory::ExtraCoefficients(n) => {
                write!(f, "{n} coefficients supplied, only the first 3 are used")
            }
            CalibrationAdvisory::NegativeOffset(a0) => {
                write!(f, "negative calibration offset a0 = {a0} on {STRICT_OFFSET_MODEL}")
            }
            CalibrationAdvisory::OffsetBelowRange(a0) => {
                write!(f, "calibration offset a0 = {a0} is below {OFFSET_FLOOR_KEV} keV")
            }
            CalibrationAdvisory::OffsetAboveRange(a0) => {
                write!(f, "calibration offset a0 = {a0} is above {OFFSET_CEILING_KEV} keV")
            }
        }
    }
}

fn ensure_non_zero(terms: [f64; 3]) -> PipelineResult<()> {
    match terms.iter().position(|&c| c == 0.0) {
        Some(position) => Err(PipelineError::InvalidCalibration(format!(
            "coefficient a{position} is zero"
        ))),
        None => Ok(()),
    }
}

/// Offset checks; the lower bound depends on the detector model.
fn offset_advisories(a0: f64, device_model: &str) -> Vec<CalibrationAdvisory> {
    let mut advisories = Vec::new();
    if device_model == STRICT_OFFSET_MODEL {
        if a0 < 0.0 {
            advisories.push(CalibrationAdvisory::NegativeOffset(a0));
        }
    } else if a0 < OFFSET_FLOOR_KEV {
        advisories.push(CalibrationAdvisory::OffsetBelowRange(a0));
    }
    if a0 > OFFSET_CEILING_KEV {
        advisories.push(CalibrationAdvisory::OffsetAboveRange(a0));
    }
    advisories
}

impl CalibrationCoefficients {
    pub fn new(a0: f64, a1: f64, a2: f64) -> PipelineResult<Self> {
        Self::parse(&[a0, a1, a2])
    }

    fn parse(raw: &[f64]) -> PipelineResult<Self> {
        let [a0, a1, a2] = match raw {
            [a0, a1, a2, ..] => [*a0, *a1, *a2],
            _ => {
                return Err(PipelineError::InvalidCalibration(format!(
                    "expected 3 coefficients, got {}",
                    raw.len()
                )))
            }
        };
        ensure_non_zero([a0, a1, a2])?;
        Ok(Self { a0, a1, a2 })
    }

    /// Validates a raw coefficient list as exported by `device_model`.
    ///
    /// Fewer than three entries or any zero among the first three is an
    /// error. Everything else is accepted, with advisories for the caller.
    pub fn from_slice(
        raw: &[f64],
        device_model: &str,
    ) -> PipelineResult<(Self, Vec<CalibrationAdvisory>)> {
        let coefficients = Self::parse(raw)?;

        let mut advisories = Vec::new();
        if raw.len() > 3 {
            advisories.push(CalibrationAdvisory::ExtraCoefficients(raw.len()));
        }
        advisories.extend(offset_advisories(coefficients.a0, device_model));

        let logger = LogManager::new();
        for advisory in &advisories {
            logger.warn(&format!("Calibration advisory: {advisory}"));
        }

        Ok((coefficients, advisories))
    }

    pub fn a0(&self) -> f64 {
        self.a0
    }

    pub fn a1(&self) -> f64 {
        self.a1
    }

    pub fn a2(&self) -> f64 {
        self.a2
    }

    pub fn energy_at(&self, channel: usize) -> f64 {
        let i = channel as f64;
        self.a0 + self.a1 * i + self.a2 * i * i
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.a0, self.a1, self.a2]
    }
}

impl TryFrom<Vec<f64>> for CalibrationCoefficients {
    type Error = PipelineError;

    fn try_from(raw: Vec<f64>) -> PipelineResult<Self> {
        Self::parse(&raw)
    }
}

impl From<CalibrationCoefficients> for [f64; 3] {
    fn from(coefficients: CalibrationCoefficients) -> Self {
        coefficients.as_array()
    }
}

/// Maps channel indices `0..length` onto the energy axis in keV.
pub fn calibrate(
    coefficients: &CalibrationCoefficients,
    length: usize,
) -> PipelineResult<Vec<f64>> {
    ensure_non_zero(coefficients.as_array())?;
    Ok((0..length).map(|i| coefficients.energy_at(i)).collect())
}
