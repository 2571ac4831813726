pub struct StatsHelper;

impl StatsHelper {
    /// Smallest and largest sample, or `None` for an empty slice.
    pub fn bounds(samples: &[f64]) -> Option<(f64, f64)> {
        let (&first, rest) = samples.split_first()?;
        Some(
            rest.iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}
