use anyhow::{bail, Context};
use gammacore::device_interface::SpectrumRecording;
use std::fs;
use std::path::Path;

/// Reads a resolved recording from a JSON or YAML file, chosen by extension.
pub fn load_recording<P: AsRef<Path>>(path: P) -> anyhow::Result<SpectrumRecording> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading recording {}", path_ref.display()))?;

    let extension = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let recording = match extension.as_deref() {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("parsing recording {}", path_ref.display()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing recording {}", path_ref.display()))?,
        _ => bail!(
            "unsupported recording format for {} (expected .json, .yaml or .yml)",
            path_ref.display()
        ),
    };
    Ok(recording)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::TempPath {
        let mut temp = Builder::new().suffix(suffix).tempfile().unwrap();
        temp.write_all(contents.as_bytes()).unwrap();
        temp.into_temp_path()
    }

    #[test]
    fn loads_yaml_recording() {
        let path = write_temp(
            ".yaml",
            "sample_name: soil\ncoefficients: [-1.2, 2.4, 0.0004]\ncounts: [1, 2, 3]\n\
             start_time: 2024-05-01T10:00:00\nend_time: 2024-05-01T10:10:00\n",
        );
        let recording = load_recording(&path).unwrap();
        assert_eq!(recording.sample_name, "soil");
        assert_eq!(recording.counts, vec![1, 2, 3]);
        assert_eq!(recording.duration_seconds(), 600.0);
    }

    #[test]
    fn loads_json_recording() {
        let path = write_temp(
            ".json",
            r#"{"sample_name": "ore", "coefficients": [1.0, 2.0, 3.0], "counts": [4, 5],
                "start_time": "2024-05-01T10:00:00", "end_time": "2024-05-01T10:00:30"}"#,
        );
        let recording = load_recording(&path).unwrap();
        assert_eq!(recording.counts, vec![4, 5]);
        assert!(recording.background.is_none());
    }

    #[test]
    fn rejects_unknown_extension() {
        let path = write_temp(".xml", "<ResultDataFile/>");
        let err = load_recording(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported recording format"));
    }
}
