use anyhow::Context;
use gammacore::prelude::{PeakParams, PipelineConfig, SmoothingParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub low_smooth: u32,
    pub high_smooth: u32,
    pub peak_height: u32,
    pub peak_prominence: u32,
    pub peak_distance: usize,
    pub detect_peaks: bool,
    pub include_last_channel: bool,
    pub subtract_background: bool,
    pub cache_capacity: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            low_smooth: pipeline.smoothing.low_window,
            high_smooth: pipeline.smoothing.high_window,
            peak_height: pipeline.peaks.height_pct,
            peak_prominence: pipeline.peaks.prominence_pct,
            peak_distance: pipeline.peaks.distance,
            detect_peaks: pipeline.detect_peaks,
            include_last_channel: pipeline.include_last_channel,
            subtract_background: false,
            cache_capacity: 8,
        }
    }
}

/// Command-line values that take precedence over the loaded workflow.
#[derive(Clone, Debug, Default)]
pub struct WorkflowOverrides {
    pub low_smooth: Option<u32>,
    pub high_smooth: Option<u32>,
    pub peak_height: Option<u32>,
    pub peak_prominence: Option<u32>,
    pub peak_distance: Option<usize>,
    pub disable_peaks: bool,
    pub include_last_channel: bool,
    pub subtract_background: bool,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: &WorkflowOverrides) -> Self {
        if let Some(value) = overrides.low_smooth {
            self.low_smooth = value;
        }
        if let Some(value) = overrides.high_smooth {
            self.high_smooth = value;
        }
        if let Some(value) = overrides.peak_height {
            self.peak_height = value;
        }
        if let Some(value) = overrides.peak_prominence {
            self.peak_prominence = value;
        }
        if let Some(value) = overrides.peak_distance {
            self.peak_distance = value;
        }
        self.detect_peaks &= !overrides.disable_peaks;
        self.include_last_channel |= overrides.include_last_channel;
        self.subtract_background |= overrides.subtract_background;
        self
    }

    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            smoothing: SmoothingParams {
                low_window: self.low_smooth,
                high_window: self.high_smooth,
            },
            peaks: PeakParams {
                height_pct: self.peak_height,
                prominence_pct: self.peak_prominence,
                distance: self.peak_distance,
            },
            detect_peaks: self.detect_peaks,
            include_last_channel: self.include_last_channel,
        }
    }
}
