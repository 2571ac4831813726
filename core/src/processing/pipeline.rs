use serde::{Deserialize, Serialize};

use crate::device_interface::PeakRecord;
use crate::prelude::{PipelineConfig, PipelineError, PipelineResult, SmoothingParams, Spectrum};
use crate::processing::background::subtract_background;
use crate::processing::cache::{Fingerprint, StageCache};
use crate::processing::calibration::calibrate;
use crate::processing::efficiency::compensate;
use crate::processing::normalize::normalize;
use crate::processing::peaks::detect_peak_records;
use crate::processing::smoothing::smooth_with;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};

/// Spectra taking part in one recomputation.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub foreground: &'a Spectrum,
    pub background: Option<&'a Spectrum>,
    pub subtract_background: bool,
}

impl<'a> AnalysisRequest<'a> {
    pub fn foreground(spectrum: &'a Spectrum) -> Self {
        Self {
            foreground: spectrum,
            background: None,
            subtract_background: false,
        }
    }

    pub fn with_background(mut self, background: &'a Spectrum, subtract: bool) -> Self {
        self.background = Some(background);
        self.subtract_background = subtract;
        self
    }
}

/// Normalized traces of one spectrum over its own energy axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSet {
    pub energies: Vec<f64>,
    /// Raw counts, normalized.
    pub original: Vec<f64>,
    /// Compensated, smoothed and normalized counts.
    pub compensated: Vec<f64>,
}

/// Background-subtracted traces over the foreground energy axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtractedCurves {
    pub original: Vec<f64>,
    pub compensated: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub foreground: CurveSet,
    pub background: Option<CurveSet>,
    pub subtracted: Option<SubtractedCurves>,
    pub peaks: Vec<PeakRecord>,
}

fn cached<F>(
    cache: &mut StageCache<Vec<f64>>,
    metrics: &MetricsRecorder,
    key: Fingerprint,
    compute: F,
) -> PipelineResult<Vec<f64>>
where
    F: FnOnce() -> PipelineResult<Vec<f64>>,
{
    let (value, hit) = cache.get_or_try_insert_with(key, compute)?;
    metrics.record_cache(hit);
    Ok(value)
}

/// Recomputes every derived curve for a set of spectra, reusing stage
/// outputs whose inputs have not changed since an earlier run.
pub struct SpectrumPipeline {
    energies: StageCache<Vec<f64>>,
    compensated: StageCache<Vec<f64>>,
    smoothed: StageCache<Vec<f64>>,
    normalized: StageCache<Vec<f64>>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl SpectrumPipeline {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            energies: StageCache::with_capacity(cache_capacity),
            compensated: StageCache::with_capacity(cache_capacity),
            smoothed: StageCache::with_capacity(cache_capacity),
            normalized: StageCache::with_capacity(cache_capacity),
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn energies(&mut self, spectrum: &Spectrum) -> PipelineResult<Vec<f64>> {
        let key = Fingerprint::builder("calibrate")
            .samples(&spectrum.coefficients.as_array())
            .value(&spectrum.len())
            .finish();
        cached(&mut self.energies, &self.metrics, key, || {
            calibrate(&spectrum.coefficients, spectrum.len())
        })
    }

    fn normalized(&mut self, values: &[f64]) -> PipelineResult<Vec<f64>> {
        let key = Fingerprint::builder("normalize").samples(values).finish();
        cached(&mut self.normalized, &self.metrics, key, || normalize(values))
    }

    /// Compensate, smooth and normalize `values` over `energies`.
    pub fn compensated_curve(
        &mut self,
        energies: &[f64],
        values: &[f64],
        smoothing: &SmoothingParams,
    ) -> PipelineResult<Vec<f64>> {
        let key = Fingerprint::builder("compensate")
            .samples(energies)
            .samples(values)
            .finish();
        let compensated = cached(&mut self.compensated, &self.metrics, key, || {
            compensate(energies, values)
        })?;

        let key = Fingerprint::builder("smooth")
            .samples(energies)
            .samples(&compensated)
            .value(smoothing)
            .finish();
        let smoothed = cached(&mut self.smoothed, &self.metrics, key, || {
            smooth_with(energies, &compensated, smoothing)
        })?;

        self.normalized(&smoothed)
    }

    fn curve_set(
        &mut self,
        spectrum: &Spectrum,
        smoothing: &SmoothingParams,
    ) -> PipelineResult<CurveSet> {
        let energies = self.energies(spectrum)?;
        let counts = spectrum.counts_f64();
        let original = self.normalized(&counts)?;
        let compensated = self.compensated_curve(&energies, &counts, smoothing)?;
        Ok(CurveSet {
            energies,
            original,
            compensated,
        })
    }

    fn run(
        &mut self,
        request: &AnalysisRequest<'_>,
        config: &PipelineConfig,
    ) -> PipelineResult<AnalysisOutput> {
        let foreground = self.curve_set(request.foreground, &config.smoothing)?;

        let background = request
            .background
            .map(|spectrum| self.curve_set(spectrum, &config.smoothing))
            .transpose()?;

        let subtracted = if request.subtract_background {
            let background = background.as_ref().ok_or_else(|| {
                PipelineError::InvalidInput("subtraction requested without a background".into())
            })?;
            let original = subtract_background(&foreground.original, &background.original)?;
            let compensated =
                self.compensated_curve(&foreground.energies, &original, &config.smoothing)?;
            Some(SubtractedCurves {
                original,
                compensated,
            })
        } else {
            None
        };

        // Peaks always follow the compensated foreground, whatever is displayed.
        let peaks = if config.detect_peaks {
            detect_peak_records(&foreground.compensated, &foreground.energies, &config.peaks)?
        } else {
            Vec::new()
        };

        Ok(AnalysisOutput {
            foreground,
            background,
            subtracted,
            peaks,
        })
    }

    pub fn analyze(
        &mut self,
        request: &AnalysisRequest<'_>,
        config: &PipelineConfig,
    ) -> PipelineResult<AnalysisOutput> {
        match self.run(request, config) {
            Ok(output) => {
                self.metrics.record_processed();
                self.logger.record(&format!(
                    "Pipeline processed {} channels, {} peaks",
                    output.foreground.energies.len(),
                    output.peaks.len()
                ));
                Ok(output)
            }
            Err(err) => {
                self.metrics.record_error();
                self.logger.warn(&format!("Pipeline run failed: {err}"));
                Err(err)
            }
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn reset(&mut self) {
        self.energies.reset();
        self.compensated.reset();
        self.smoothed.reset();
        self.normalized.reset();
        self.logger.trace("Pipeline caches cleared");
    }
}

impl Default for SpectrumPipeline {
    fn default() -> Self {
        Self::new(8)
    }
}
