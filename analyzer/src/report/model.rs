use chrono::NaiveDateTime;
use gammacore::device_interface::PeakRecord;
use gammacore::processing::AnalysisOutput;
use serde::{Deserialize, Serialize};

/// Serializable summary of one analysis, handed to whatever presents it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub sample_name: String,
    pub device_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_seconds: f64,
    pub total_counts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_rate: Option<f64>,
    pub channels: usize,
    pub advisories: Vec<String>,
    pub peaks: Vec<PeakRecord>,
    pub background_subtracted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curves: Option<AnalysisOutput>,
}

impl AnalysisReport {
    pub fn peak_energies(&self) -> Vec<f64> {
        self.peaks.iter().map(|peak| peak.energy_kev).collect()
    }

    /// One-line plain-text form used for the appended run log.
    pub fn log_line(&self) -> String {
        format!(
            "sample={} device={} channels={} duration={}s counts={} peaks={:?} subtracted={} \
             advisories={:?}\n",
            self.sample_name,
            self.device_model,
            self.channels,
            self.duration_seconds,
            self.total_counts,
            self.peak_energies(),
            self.background_subtracted,
            self.advisories
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn report() -> AnalysisReport {
        let start = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        AnalysisReport {
            sample_name: "thorianite".into(),
            device_model: "RC-102".into(),
            serial_number: None,
            start_time: start,
            end_time: start + chrono::TimeDelta::seconds(120),
            duration_seconds: 120.0,
            total_counts: 4800,
            count_rate: Some(40.0),
            channels: 1023,
            advisories: vec!["calibration offset a0 = 31 is above 30 keV".into()],
            peaks: vec![
                PeakRecord::new(98, 238.6, 0.92, 0.71),
                PeakRecord::new(232, 583.2, 0.44, 0.30),
            ],
            background_subtracted: false,
            curves: None,
        }
    }

    #[test]
    fn peak_energies_keep_detection_order() {
        assert_eq!(report().peak_energies(), vec![238.6, 583.2]);
    }

    #[test]
    fn log_line_is_a_single_terminated_line() {
        let line = report().log_line();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.starts_with("sample=thorianite device=RC-102 channels=1023 duration=120s"));
        assert!(line.contains("counts=4800 peaks=[238.6, 583.2] subtracted=false"));
        assert!(line.contains("above 30 keV"));
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let json = serde_json::to_value(report()).unwrap();
        assert!(json.get("serial_number").is_none());
        assert!(json.get("curves").is_none());
        assert_eq!(json["peaks"][1]["energy_kev"], 583.2);
    }
}
