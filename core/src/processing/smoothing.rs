use crate::math::stats::StatsHelper;
use crate::prelude::{ensure_same_length, PipelineResult, SmoothingParams};

/// Half-width of the averaging window at relative energy position `position`.
fn half_window(params: &SmoothingParams, position: f64) -> usize {
    let low = f64::from(params.low_window);
    let high = f64::from(params.high_window);
    let width = (low + (high - low) * position) as usize;
    width / 2
}

/// Moving average whose window grows linearly with energy, from
/// `low_window` at the lowest energy to `high_window` at the highest.
///
/// Windows are truncated at both ends of the sequence.
pub fn smooth(
    energies: &[f64],
    values: &[f64],
    low_window: u32,
    high_window: u32,
) -> PipelineResult<Vec<f64>> {
    smooth_with(
        energies,
        values,
        &SmoothingParams {
            low_window,
            high_window,
        },
    )
}

pub fn smooth_with(
    energies: &[f64],
    values: &[f64],
    params: &SmoothingParams,
) -> PipelineResult<Vec<f64>> {
    ensure_same_length(energies, values)?;
    let Some((min_energy, max_energy)) = StatsHelper::bounds(energies) else {
        return Ok(Vec::new());
    };
    let span = max_energy - min_energy;
    let len = values.len();

    Ok(energies
        .iter()
        .enumerate()
        .map(|(i, &energy)| {
            // A flat axis has no position to interpolate along.
            let position = if span > 0.0 {
                (energy - min_energy) / span
            } else {
                0.0
            };
            let half = half_window(params, position);
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(len);
            StatsHelper::mean(&values[start..end])
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::PipelineError;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn unit_windows_leave_values_unchanged() {
        let energies = [10.0, 20.0, 30.0, 40.0];
        let values = [5.0, 1.0, 9.0, 2.0];
        assert_eq!(smooth(&energies, &values, 1, 1).unwrap(), values.to_vec());
    }

    #[test]
    fn constant_window_averages_neighbours() {
        let energies = [0.0, 1.0, 2.0, 3.0, 4.0];
        let values = [0.0, 3.0, 6.0, 9.0, 12.0];
        let smoothed = smooth(&energies, &values, 3, 3).unwrap();
        // Edges average over the truncated window.
        assert_eq!(smoothed, vec![1.5, 3.0, 6.0, 9.0, 10.5]);
    }

    #[test]
    fn window_grows_with_energy() {
        let energies = [0.0, 1.0, 2.0, 3.0, 4.0];
        let values = [0.0, 0.0, 0.0, 0.0, 10.0];
        let smoothed = smooth(&energies, &values, 1, 5).unwrap();
        // position 0.75 → width 4 → half 2; position 1.0 → width 5 → half 2.
        assert_eq!(smoothed[0], 0.0);
        assert_approx_eq!(smoothed[3], 2.5, 1e-12);
        assert_approx_eq!(smoothed[4], 10.0 / 3.0, 1e-12);
    }

    #[test]
    fn decreasing_bounds_interpolate_downwards() {
        let params = SmoothingParams {
            low_window: 9,
            high_window: 1,
        };
        assert_eq!(half_window(&params, 0.0), 4);
        assert_eq!(half_window(&params, 0.5), 2);
        assert_eq!(half_window(&params, 1.0), 0);
    }

    #[test]
    fn flat_energy_axis_uses_low_window() {
        let energies = [7.0, 7.0, 7.0];
        let values = [3.0, 6.0, 9.0];
        let smoothed = smooth(&energies, &values, 3, 99).unwrap();
        assert_eq!(smoothed, vec![4.5, 6.0, 7.5]);
    }

    #[test]
    fn single_point_is_returned_as_is() {
        assert_eq!(smooth(&[5.0], &[2.0], 3, 9).unwrap(), vec![2.0]);
        assert!(smooth(&[], &[], 3, 9).unwrap().is_empty());
    }

    #[test]
    fn mismatched_lengths_fail() {
        assert!(matches!(
            smooth(&[1.0, 2.0], &[1.0, 2.0, 3.0], 1, 1),
            Err(PipelineError::LengthMismatch { left: 2, right: 3 })
        ));
    }
}
