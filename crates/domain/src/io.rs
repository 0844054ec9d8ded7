use serde::{Deserialize, Serialize};

use crate::{analysis::AnalysisReport, error::AnalysisError};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

pub trait ResultExporter {
    /// Renders a report. `detail` controls whether diagnostic values are
    /// included alongside the result fields.
    fn export(
        &self,
        report: &AnalysisReport,
        format: ExportFormat,
        detail: bool,
    ) -> Result<Vec<u8>, AnalysisError>;
}

pub struct JsonExporter;

impl ResultExporter for JsonExporter {
    fn export(
        &self,
        report: &AnalysisReport,
        format: ExportFormat,
        detail: bool,
    ) -> Result<Vec<u8>, AnalysisError> {
        let encoded = match format {
            ExportFormat::Json if detail => serde_json::to_vec_pretty(report),
            ExportFormat::Json => serde_json::to_vec_pretty(&report.result),
            other => {
                return Err(AnalysisError::Serialization(format!(
                    "JsonExporter cannot handle {:?}",
                    other
                )))
            }
        };
        encoded.map_err(|err| AnalysisError::Serialization(err.to_string()))
    }
}

pub struct TextExporter;

impl ResultExporter for TextExporter {
    fn export(
        &self,
        report: &AnalysisReport,
        format: ExportFormat,
        detail: bool,
    ) -> Result<Vec<u8>, AnalysisError> {
        if format != ExportFormat::Text {
            return Err(AnalysisError::Serialization(format!(
                "TextExporter cannot handle {:?}",
                format
            )));
        }
        let result = &report.result;
        let mut line = format!(
            "{:.1} BPM, {}, variation {:.2}%",
            result.bpm(),
            result.status(),
            result.variation_percent()
        );
        if detail {
            let info = &report.detail;
            line.push_str(&format!(
                " ({} beats over {:.2} s at {:.1} Hz, decimation x{})",
                info.beat_count(),
                info.duration_seconds,
                info.effective_rate_hz,
                info.decimation_factor
            ));
        }
        line.push('\n');
        Ok(line.into_bytes())
    }
}

/// Picks the exporter that handles `format`.
pub fn exporter_for(format: ExportFormat) -> &'static dyn ResultExporter {
    match format {
        ExportFormat::Json => &JsonExporter,
        ExportFormat::Text => &TextExporter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisDetail, AnalysisResult, RhythmStatus};

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            result: AnalysisResult::new(61.24, RhythmStatus::Regular, 3.333),
            detail: AnalysisDetail {
                effective_rate_hz: 2_000.0,
                decimation_factor: 2,
                duration_seconds: 10.0,
                beat_times_s: vec![0.5, 1.5],
                intervals_s: vec![1.0],
            },
        }
    }

    #[test]
    fn exports_json() {
        let bytes = JsonExporter
            .export(&sample_report(), ExportFormat::Json, false)
            .unwrap();
        let output = String::from_utf8(bytes).unwrap();
        assert!(output.contains("\"status\": \"Regular\""));
        assert!(output.contains("\"variation\": 3.33"));
        assert!(!output.contains("detail"));
    }

    #[test]
    fn exports_json_with_detail() {
        let bytes = JsonExporter
            .export(&sample_report(), ExportFormat::Json, true)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["bpm"], 61.2);
        assert_eq!(value["detail"]["decimation_factor"], 2);
    }

    #[test]
    fn exports_text_line() {
        let bytes = exporter_for(ExportFormat::Text)
            .export(&sample_report(), ExportFormat::Text, true)
            .unwrap();
        let output = String::from_utf8(bytes).unwrap();
        assert!(output.starts_with("61.2 BPM, Regular, variation 3.33%"));
        assert!(output.contains("2 beats"));
    }

    #[test]
    fn json_exporter_rejects_text() {
        assert!(JsonExporter
            .export(&sample_report(), ExportFormat::Text, false)
            .is_err());
    }
}
