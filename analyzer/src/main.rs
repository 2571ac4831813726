use anyhow::{bail, Context};
use clap::Parser;
use generator::profile::{build_recording, build_recording_from_config, GeneratorConfig};
use gammacore::device_interface::SpectrumRecording;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use workflow::config::{WorkflowConfig, WorkflowOverrides};
use workflow::input::load_recording;
use workflow::runner::{BackgroundSource, Runner};

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline gamma spectrum analysis driver")]
struct Args {
    /// Recording to analyze (JSON or YAML)
    #[arg(long, conflicts_with = "synthetic")]
    spectrum: Option<PathBuf>,
    /// Analyze a generated recording instead of a file
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Generator settings for --synthetic, as YAML
    #[arg(long, requires = "synthetic")]
    generator: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 1024)]
    channels: usize,
    /// External background recording (JSON or YAML)
    #[arg(long, conflicts_with = "embedded_background")]
    background: Option<PathBuf>,
    /// Use the background stored inside the recording
    #[arg(long, default_value_t = false)]
    embedded_background: bool,
    /// Subtract the background from the foreground
    #[arg(long, default_value_t = false)]
    subtract: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long)]
    low_smooth: Option<u32>,
    #[arg(long)]
    high_smooth: Option<u32>,
    /// Minimum peak height, percent of the normalized range
    #[arg(long)]
    height: Option<u32>,
    /// Minimum peak prominence, percent of the normalized range
    #[arg(long)]
    prominence: Option<u32>,
    /// Minimum distance between peaks, in channels
    #[arg(long)]
    distance: Option<usize>,
    #[arg(long, default_value_t = false)]
    no_peaks: bool,
    /// Keep the trailing overflow channel
    #[arg(long, default_value_t = false)]
    include_last_channel: bool,
    /// Write the JSON report to this path
    #[arg(long)]
    json: Option<PathBuf>,
    /// Include every derived curve in the JSON report
    #[arg(long, default_value_t = false)]
    include_curves: bool,
    /// Append a one-line summary to this log file
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> WorkflowOverrides {
        WorkflowOverrides {
            low_smooth: self.low_smooth,
            high_smooth: self.high_smooth,
            peak_height: self.height,
            peak_prominence: self.prominence,
            peak_distance: self.distance,
            disable_peaks: self.no_peaks,
            include_last_channel: self.include_last_channel,
            subtract_background: self.subtract,
        }
    }

    fn recording(&self) -> anyhow::Result<SpectrumRecording> {
        if let Some(path) = &self.spectrum {
            return load_recording(path);
        }
        if !self.synthetic {
            bail!("either --spectrum or --synthetic is required");
        }
        match &self.generator {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("reading generator config {}", path.display()))?;
                let config: GeneratorConfig = serde_yaml::from_str(&contents)
                    .with_context(|| format!("parsing generator config {}", path.display()))?;
                build_recording_from_config(&config)
            }
            None => build_recording(self.channels, self.seed),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::default(),
    }
    .with_overrides(&args.overrides());

    let recording = args.recording()?;
    let external = args.background.as_ref().map(load_recording).transpose()?;
    let background = match (&external, args.embedded_background) {
        (Some(external), _) => BackgroundSource::External(external),
        (None, true) => BackgroundSource::Embedded,
        (None, false) => BackgroundSource::None,
    };
    if workflow_config.subtract_background && matches!(background, BackgroundSource::None) {
        bail!("--subtract needs --background or --embedded-background");
    }

    let runner = Runner::new(workflow_config);
    let result = runner.execute(&recording, background)?;
    log::debug!(
        "cache hits {}, misses {}",
        result.metrics.cache_hits,
        result.metrics.cache_misses
    );

    let report = runner.report(&recording, result, args.include_curves);
    println!(
        "{} ({}) -> channels {}, duration {}s, peaks {:?}",
        report.sample_name,
        report.device_model,
        report.channels,
        report.duration_seconds,
        report.peak_energies()
    );

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
    }

    if let Some(report_path) = &args.report {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)
            .with_context(|| format!("opening run log {}", report_path.display()))?;
        file.write_all(report.log_line().as_bytes())?;
    }

    Ok(())
}
