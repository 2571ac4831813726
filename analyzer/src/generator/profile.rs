use anyhow::Context;
use chrono::{NaiveDate, TimeDelta};
use gammacore::device_interface::{BackgroundRecording, SpectrumRecording};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::template::{exponential_continuum, gaussian_line};

/// Single photopeak in a synthetic recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionLine {
    pub energy_kev: f64,
    pub amplitude: f64,
    pub sigma_channels: f64,
}

/// Configuration for generating synthetic detector recordings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sample_name: String,
    pub serial_number: Option<String>,
    pub channels: usize,
    pub coefficients: Vec<f64>,
    pub lines: Vec<EmissionLine>,
    pub continuum: f64,
    pub continuum_decay: f64,
    pub noise: f64,
    pub seed: u64,
    pub duration_secs: i64,
    pub embed_background: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_name: "synthetic".into(),
            serial_number: Some("RC-102-000000".into()),
            channels: 1024,
            coefficients: vec![-2.5, 2.45, 0.0004],
            lines: vec![
                EmissionLine {
                    energy_kev: 351.9,
                    amplitude: 240.0,
                    sigma_channels: 4.0,
                },
                EmissionLine {
                    energy_kev: 609.3,
                    amplitude: 320.0,
                    sigma_channels: 5.0,
                },
                EmissionLine {
                    energy_kev: 1460.8,
                    amplitude: 90.0,
                    sigma_channels: 7.0,
                },
            ],
            continuum: 800.0,
            continuum_decay: 180.0,
            noise: 0.05,
            seed: 0,
            duration_secs: 600,
            embed_background: true,
        }
    }
}

impl GeneratorConfig {
    fn normalized_channels(&self) -> usize {
        self.channels.max(3)
    }
}

/// Fractional channel at which the quadratic calibration reaches `energy`.
pub fn channel_for_energy(coefficients: &[f64], energy: f64) -> Option<f64> {
    let [a0, a1, a2] = match coefficients {
        [a0, a1, a2, ..] => [*a0, *a1, *a2],
        _ => return None,
    };
    if a2 == 0.0 {
        return (a1 != 0.0).then(|| (energy - a0) / a1);
    }
    let discriminant = a1 * a1 - 4.0 * a2 * (a0 - energy);
    (discriminant >= 0.0).then(|| (-a1 + discriminant.sqrt()) / (2.0 * a2))
}

fn build_counts(config: &GeneratorConfig, lines: &[EmissionLine], rng: &mut StdRng) -> Vec<u64> {
    let channels = config.normalized_channels();
    let mut expected = exponential_continuum(channels, config.continuum, config.continuum_decay);

    for line in lines {
        let Some(centre) = channel_for_energy(&config.coefficients, line.energy_kev) else {
            continue;
        };
        let shape = gaussian_line(channels, centre, line.sigma_channels, line.amplitude);
        for (value, extra) in expected.iter_mut().zip(shape) {
            *value += extra;
        }
    }

    expected
        .into_iter()
        .map(|value| {
            let jitter = if config.noise > 0.0 {
                rng.gen_range(-config.noise..config.noise)
            } else {
                0.0
            };
            (value * (1.0 + jitter)).round().max(0.0) as u64
        })
        .collect()
}

pub fn build_recording_from_config(config: &GeneratorConfig) -> anyhow::Result<SpectrumRecording> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let counts = build_counts(config, &config.lines, &mut rng);

    let background = config.embed_background.then(|| BackgroundRecording {
        coefficients: config.coefficients.clone(),
        counts: build_counts(config, &[], &mut rng),
    });

    let start_time = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .context("building generator start time")?;
    let duration = TimeDelta::try_seconds(config.duration_secs)
        .context("generator duration out of range")?;

    Ok(SpectrumRecording {
        sample_name: config.sample_name.clone(),
        serial_number: config.serial_number.clone(),
        coefficients: config.coefficients.clone(),
        counts,
        start_time,
        end_time: start_time + duration,
        background,
    })
}

pub fn build_recording(channels: usize, seed: u64) -> anyhow::Result<SpectrumRecording> {
    let config = GeneratorConfig {
        channels,
        seed,
        ..Default::default()
    };
    build_recording_from_config(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_channel_count() {
        let recording = build_recording(1024, 7).unwrap();
        assert_eq!(recording.counts.len(), 1024);
        assert_eq!(recording.background.as_ref().unwrap().counts.len(), 1024);
        assert_eq!(recording.duration_seconds(), 600.0);
        assert_eq!(recording.device_model(), "RC-102");
    }

    #[test]
    fn same_seed_reproduces_counts() {
        let a = build_recording(256, 3).unwrap();
        let b = build_recording(256, 3).unwrap();
        let c = build_recording(256, 4).unwrap();
        assert_eq!(a.counts, b.counts);
        assert_ne!(a.counts, c.counts);
    }

    #[test]
    fn lines_land_on_their_calibrated_channel() {
        let config = GeneratorConfig {
            channels: 512,
            coefficients: vec![1.0, 2.0, 0.001],
            lines: vec![EmissionLine {
                energy_kev: 661.7,
                amplitude: 5000.0,
                sigma_channels: 3.0,
            }],
            continuum: 10.0,
            noise: 0.0,
            embed_background: false,
            ..Default::default()
        };
        let recording = build_recording_from_config(&config).unwrap();
        let centre = channel_for_energy(&config.coefficients, 661.7).unwrap().round() as usize;
        let (peak, _) = recording
            .counts
            .iter()
            .enumerate()
            .max_by_key(|(_, &c)| c)
            .unwrap();
        assert_eq!(peak, centre);
        assert!(recording.background.is_none());
    }

    #[test]
    fn channel_inverse_handles_linear_calibration() {
        assert_eq!(channel_for_energy(&[10.0, 2.0, 0.0], 30.0), Some(10.0));
        assert_eq!(channel_for_energy(&[10.0, 2.0], 30.0), None);
    }
}
