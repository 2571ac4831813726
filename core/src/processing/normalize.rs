use crate::math::stats::StatsHelper;
use crate::prelude::{PipelineError, PipelineResult};

/// Linearly rescales `values` onto `[0, 1]`.
pub fn normalize(values: &[f64]) -> PipelineResult<Vec<f64>> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::InvalidInput(
            "curve contains non-finite samples".into(),
        ));
    }
    let (min, max) = StatsHelper::bounds(values)
        .ok_or_else(|| PipelineError::InvalidInput("cannot normalize an empty curve".into()))?;
    let range = max - min;
    if range == 0.0 {
        return Err(PipelineError::DivisionByZero(format!(
            "curve is flat at {min}"
        )));
    }
    Ok(values.iter().map(|&v| (v - min) / range).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn output_spans_unit_interval() {
        let normalized = normalize(&[4.0, 2.0, 10.0, 6.0]).unwrap();
        assert_eq!(normalized, vec![0.25, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn two_distinct_values_map_to_bounds() {
        let normalized = normalize(&[-3.5, -3.5, 12.25]).unwrap();
        assert_eq!(StatsHelper::bounds(&normalized), Some((0.0, 1.0)));
    }

    #[test]
    fn renormalizing_is_idempotent() {
        let once = normalize(&[0.3, 17.0, 5.5, 2.25, 9.0]).unwrap();
        let twice = normalize(&once).unwrap();
        for (a, b) in once.iter().zip(&twice) {
            assert_approx_eq!(a, b, 1e-12);
        }
    }

    #[test]
    fn flat_curve_is_division_by_zero() {
        assert!(matches!(
            normalize(&[2.0, 2.0, 2.0]),
            Err(PipelineError::DivisionByZero(_))
        ));
        assert!(matches!(
            normalize(&[1.0]),
            Err(PipelineError::DivisionByZero(_))
        ));
    }

    #[test]
    fn empty_or_non_finite_curves_are_invalid() {
        assert!(matches!(normalize(&[]), Err(PipelineError::InvalidInput(_))));
        assert!(matches!(
            normalize(&[1.0, f64::NAN]),
            Err(PipelineError::InvalidInput(_))
        ));
    }
}
