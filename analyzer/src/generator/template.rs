/// Gaussian photopeak of `amplitude` counts centred on `centre` (channels).
pub fn gaussian_line(length: usize, centre: f64, sigma: f64, amplitude: f64) -> Vec<f64> {
    let spread = 2.0 * sigma * sigma;
    (0..length)
        .map(|i| {
            let offset = i as f64 - centre;
            amplitude * (-(offset * offset) / spread).exp()
        })
        .collect()
}

/// Compton-like continuum decaying from `level` with scale `decay` channels.
pub fn exponential_continuum(length: usize, level: f64, decay: f64) -> Vec<f64> {
    (0..length)
        .map(|i| level * (-(i as f64) / decay.max(f64::EPSILON)).exp())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_peaks_at_centre() {
        let line = gaussian_line(21, 10.0, 2.0, 50.0);
        assert_eq!(line[10], 50.0);
        assert!(line[9] < 50.0 && line[11] < 50.0);
        assert_eq!(line[9], line[11]);
    }

    #[test]
    fn continuum_decays() {
        let continuum = exponential_continuum(4, 100.0, 1.0);
        assert_eq!(continuum[0], 100.0);
        assert!(continuum.windows(2).all(|w| w[1] < w[0]));
    }
}
