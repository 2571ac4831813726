use serde::{Deserialize, Serialize};

/// Peak emitted by the detector stage, positioned on the energy axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    pub index: usize,
    /// Energy at `index`, rounded to 0.1 keV.
    pub energy_kev: f64,
    pub height: f64,
    pub prominence: f64,
}

impl PeakRecord {
    pub fn new(index: usize, energy_kev: f64, height: f64, prominence: f64) -> Self {
        Self {
            index,
            energy_kev,
            height,
            prominence,
        }
    }
}
