use crate::math::stats::StatsHelper;
use crate::prelude::{ensure_same_length, PipelineResult};

/// Terms of the detector response, ordered by power of `ln(E / MeV)`.
const EFFICIENCY_TERMS: [f64; 5] = [-4.09527, -2.34638, 0.228436, 0.31551, 0.0383176];

/// Added on top of the magnitude of a non-positive minimum energy, in keV.
const ENERGY_SHIFT_MARGIN_KEV: f64 = 0.1;

/// Detection efficiency at `energy_mev`.
pub fn efficiency(energy_mev: f64) -> f64 {
    debug_assert!(
        energy_mev > 0.0,
        "efficiency requires a positive energy, got {energy_mev}"
    );
    let l = energy_mev.ln();
    let ln_eff = EFFICIENCY_TERMS[0]
        + EFFICIENCY_TERMS[1] * l
        + EFFICIENCY_TERMS[2] * l.powi(2)
        + EFFICIENCY_TERMS[3] * l.powi(3)
        + EFFICIENCY_TERMS[4] * l.powi(4);
    ln_eff.exp()
}

/// Shift applied to the whole axis so its minimum lands above zero.
fn energy_shift(energies: &[f64]) -> f64 {
    match StatsHelper::bounds(energies) {
        Some((min, _)) if min <= 0.0 => min.abs() + ENERGY_SHIFT_MARGIN_KEV,
        _ => 0.0,
    }
}

/// Divides each count by the detector efficiency at its energy (keV).
pub fn compensate(energies: &[f64], counts: &[f64]) -> PipelineResult<Vec<f64>> {
    ensure_same_length(energies, counts)?;

    let shift = energy_shift(energies);
    Ok(energies
        .iter()
        .zip(counts)
        .map(|(&energy, &count)| count / efficiency((energy + shift) / 1000.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::PipelineError;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn efficiency_at_one_mev_is_the_constant_term() {
        assert_approx_eq!(efficiency(1.0), (-4.09527f64).exp(), 1e-15);
    }

    #[test]
    fn compensate_divides_by_efficiency() {
        let energies = [100.0, 661.7, 1460.0];
        let counts = [10.0, 20.0, 30.0];
        let compensated = compensate(&energies, &counts).unwrap();
        for i in 0..3 {
            assert_approx_eq!(
                compensated[i],
                counts[i] / efficiency(energies[i] / 1000.0),
                1e-9
            );
        }
    }

    #[test]
    fn non_positive_axis_is_shifted_above_zero() {
        let energies = [-5.0, 0.0, 5.0];
        let counts = [1.0, 1.0, 1.0];
        let compensated = compensate(&energies, &counts).unwrap();
        assert_approx_eq!(compensated[0], 1.0 / efficiency(0.1 / 1000.0), 1e-9);
        assert_approx_eq!(compensated[2], 1.0 / efficiency(10.1 / 1000.0), 1e-9);
        assert!(compensated.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn positive_axis_is_left_untouched() {
        assert_eq!(energy_shift(&[0.5, 1.0]), 0.0);
        assert_approx_eq!(energy_shift(&[-2.0, 1.0]), 2.1, 1e-12);
        assert_approx_eq!(energy_shift(&[0.0, 1.0]), 0.1, 1e-12);
    }

    #[test]
    fn compensate_rejects_mismatched_lengths() {
        assert_eq!(
            compensate(&[1.0, 2.0], &[1.0]),
            Err(PipelineError::LengthMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn compensate_of_empty_input_is_empty() {
        assert!(compensate(&[], &[]).unwrap().is_empty());
    }
}
