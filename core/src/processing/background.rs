use crate::prelude::{ensure_same_length, PipelineResult};
use crate::processing::normalize::normalize;

/// Foreground minus background with negative residue clamped to zero.
pub fn clamped_difference(foreground: &[f64], background: &[f64]) -> PipelineResult<Vec<f64>> {
    ensure_same_length(foreground, background)?;
    Ok(foreground
        .iter()
        .zip(background)
        .map(|(&fg, &bg)| (fg - bg).max(0.0))
        .collect())
}

/// Removes a normalized background from a normalized foreground and
/// renormalizes what is left.
pub fn subtract_background(foreground: &[f64], background: &[f64]) -> PipelineResult<Vec<f64>> {
    let difference = clamped_difference(foreground, background)?;
    normalize(&difference)
}
