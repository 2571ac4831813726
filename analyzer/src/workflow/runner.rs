use crate::report::model::AnalysisReport;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use gammacore::device_interface::SpectrumRecording;
use gammacore::processing::{AnalysisOutput, AnalysisRequest, SpectrumPipeline};
use gammacore::telemetry::MetricsSnapshot;

/// Where the background spectrum for a run comes from.
#[derive(Debug, Clone, Copy)]
pub enum BackgroundSource<'a> {
    None,
    /// The background stored inside the foreground recording.
    Embedded,
    External(&'a SpectrumRecording),
}

#[derive(Debug)]
pub struct WorkflowResult {
    pub output: AnalysisOutput,
    pub advisories: Vec<String>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(
        &self,
        recording: &SpectrumRecording,
        background: BackgroundSource<'_>,
    ) -> anyhow::Result<WorkflowResult> {
        let pipeline_config = self.config.to_pipeline_config();
        let include_last = pipeline_config.include_last_channel;

        let (foreground, mut advisories) = recording
            .to_spectrum(include_last)
            .with_context(|| format!("validating recording {}", recording.sample_name))?;

        let background = match background {
            BackgroundSource::None => None,
            BackgroundSource::Embedded => {
                let embedded = recording.background.as_ref().with_context(|| {
                    format!("{} has no embedded background", recording.sample_name)
                })?;
                Some(
                    embedded
                        .to_spectrum(include_last, &recording.device_model())
                        .context("validating embedded background")?,
                )
            }
            BackgroundSource::External(external) => Some(
                external
                    .to_spectrum(include_last)
                    .with_context(|| format!("validating background {}", external.sample_name))?,
            ),
        };

        let mut request = AnalysisRequest::foreground(&foreground);
        if let Some((spectrum, background_advisories)) = &background {
            advisories.extend(background_advisories.iter().cloned());
            request = request.with_background(spectrum, self.config.subtract_background);
        }

        let mut pipeline = SpectrumPipeline::new(self.config.cache_capacity);
        let output = pipeline
            .analyze(&request, &pipeline_config)
            .context("executing spectrum pipeline")?;

        Ok(WorkflowResult {
            output,
            advisories: advisories.iter().map(ToString::to_string).collect(),
            metrics: pipeline.metrics(),
        })
    }

    pub fn report(
        &self,
        recording: &SpectrumRecording,
        result: WorkflowResult,
        include_curves: bool,
    ) -> AnalysisReport {
        AnalysisReport {
            sample_name: recording.sample_name.clone(),
            device_model: recording.device_model(),
            serial_number: recording.serial_number.clone(),
            start_time: recording.start_time,
            end_time: recording.end_time,
            duration_seconds: recording.duration_seconds(),
            total_counts: recording.total_counts(self.config.include_last_channel),
            count_rate: recording.count_rate(self.config.include_last_channel),
            channels: result.output.foreground.energies.len(),
            advisories: result.advisories,
            peaks: result.output.peaks.clone(),
            background_subtracted: result.output.subtracted.is_some(),
            curves: include_curves.then_some(result.output),
        }
    }
}
