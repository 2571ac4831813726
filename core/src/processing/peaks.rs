use std::cmp::Ordering;

use crate::device_interface::PeakRecord;
use crate::prelude::{ensure_same_length, PeakParams, PipelineResult};

/// Indices of all local maxima. A flat top reports its middle sample,
/// rounding towards the left edge.
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let len = values.len();
    if len < 3 {
        return Vec::new();
    }

    let last = len - 1;
    let mut peaks = Vec::new();
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Height of `values[peak]` above the higher of its two flanking minima.
///
/// Each flank is scanned outwards until a strictly taller sample or the
/// end of the curve.
pub fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];

    let mut left_min = height;
    let mut i = peak;
    loop {
        if values[i] > height {
            break;
        }
        left_min = left_min.min(values[i]);
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = height;
    for &value in &values[peak..] {
        if value > height {
            break;
        }
        right_min = right_min.min(value);
    }

    height - left_min.max(right_min)
}

/// Drops every peak closer than `distance` samples to a taller one.
/// Equal heights favour the earlier index.
fn select_by_distance(peaks: &[usize], values: &[f64], distance: usize) -> Vec<usize> {
    if distance <= 1 {
        return peaks.to_vec();
    }

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        values[peaks[b]]
            .partial_cmp(&values[peaks[a]])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; peaks.len()];
    for &j in &order {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&peak, kept)| kept.then_some(peak))
        .collect()
}

/// Peak indices and their prominences passing the height, distance and
/// prominence thresholds, in that order.
pub fn find_peaks(
    values: &[f64],
    height: f64,
    min_prominence: f64,
    distance: usize,
) -> Vec<(usize, f64)> {
    let candidates: Vec<usize> = local_maxima(values)
        .into_iter()
        .filter(|&i| values[i] >= height)
        .collect();

    select_by_distance(&candidates, values, distance)
        .into_iter()
        .map(|i| (i, prominence(values, i)))
        .filter(|&(_, p)| p >= min_prominence)
        .collect()
}

/// Rounds to 0.1 keV from the exact binary value, ties to even.
pub fn round_energy(energy: f64) -> f64 {
    format!("{energy:.1}").parse().unwrap_or(energy)
}

pub fn detect_peak_records(
    values: &[f64],
    energies: &[f64],
    params: &PeakParams,
) -> PipelineResult<Vec<PeakRecord>> {
    ensure_same_length(values, energies)?;
    params.validate()?;

    Ok(
        find_peaks(values, params.height(), params.prominence(), params.distance)
            .into_iter()
            .map(|(index, prominence)| {
                PeakRecord::new(index, round_energy(energies[index]), values[index], prominence)
            })
            .collect(),
    )
}

/// Energies of the detected peaks, rounded to 0.1 keV.
pub fn detect_peaks(
    values: &[f64],
    energies: &[f64],
    height_pct: u32,
    prominence_pct: u32,
    distance: usize,
) -> PipelineResult<Vec<f64>> {
    let params = PeakParams {
        height_pct,
        prominence_pct,
        distance,
    };
    Ok(detect_peak_records(values, energies, &params)?
        .into_iter()
        .map(|record| record.energy_kev)
        .collect())
}
