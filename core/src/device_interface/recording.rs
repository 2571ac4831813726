use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::prelude::{PipelineResult, Spectrum};
use crate::processing::calibration::CalibrationAdvisory;

/// Drops the trailing overflow channel unless asked to keep it.
fn select_channels(counts: &[u64], include_last_channel: bool) -> Vec<u64> {
    match counts.split_last() {
        Some((_, rest)) if !include_last_channel => rest.to_vec(),
        _ => counts.to_vec(),
    }
}

/// Background spectrum stored alongside a recording by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundRecording {
    pub coefficients: Vec<f64>,
    pub counts: Vec<u64>,
}

impl BackgroundRecording {
    /// `device_model` is the model of the recording that embeds this background.
    pub fn to_spectrum(
        &self,
        include_last_channel: bool,
        device_model: &str,
    ) -> PipelineResult<(Spectrum, Vec<CalibrationAdvisory>)> {
        Spectrum::from_raw(
            &self.coefficients,
            select_channels(&self.counts, include_last_channel),
            device_model,
        )
    }
}

/// Resolved contents of one exported spectrum file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumRecording {
    pub sample_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub coefficients: Vec<f64>,
    pub counts: Vec<u64>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundRecording>,
}

impl SpectrumRecording {
    pub fn to_spectrum(
        &self,
        include_last_channel: bool,
    ) -> PipelineResult<(Spectrum, Vec<CalibrationAdvisory>)> {
        Spectrum::from_raw(
            &self.coefficients,
            select_channels(&self.counts, include_last_channel),
            &self.device_model(),
        )
    }

    /// Counts summed over the channels that take part in analysis.
    pub fn total_counts(&self, include_last_channel: bool) -> u64 {
        select_channels(&self.counts, include_last_channel).iter().sum()
    }

    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 1000.0
    }

    /// Mean counts per second over the whole acquisition.
    pub fn count_rate(&self, include_last_channel: bool) -> Option<f64> {
        let seconds = self.duration_seconds();
        if seconds <= 0.0 {
            return None;
        }
        Some(self.total_counts(include_last_channel) as f64 / seconds)
    }

    /// Detector model derived from the serial number prefix.
    pub fn device_model(&self) -> String {
        match self.serial_number.as_deref() {
            Some(serial) if serial.starts_with("RC") => {
                let chars: Vec<char> = serial.chars().collect();
                match chars.get(6) {
                    Some('G') => "RC-103G".to_string(),
                    Some(_) => chars[..6].iter().collect(),
                    None => "Unknown".to_string(),
                }
            }
            _ => "Unknown".to_string(),
        }
    }
}
