use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RhythmStatus {
    Regular,
    Irregular,
    /// Fewer than two beats were found; a valid outcome, not a failure.
    Inconclusive,
}

impl RhythmStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RhythmStatus::Regular => "Regular",
            RhythmStatus::Irregular => "Irregular",
            RhythmStatus::Inconclusive => "Inconclusive",
        }
    }
}

impl fmt::Display for RhythmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of one pipeline run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    bpm: f64,
    status: RhythmStatus,
    #[serde(rename = "variation")]
    variation_percent: f64,
}

impl AnalysisResult {
    /// Builds a result, rounding BPM to one decimal place and the variation
    /// to two.
    pub fn new(bpm: f64, status: RhythmStatus, variation_percent: f64) -> Self {
        Self {
            bpm: round_to(bpm.max(0.0), 1),
            status,
            variation_percent: round_to(variation_percent.max(0.0), 2),
        }
    }

    pub fn inconclusive() -> Self {
        Self::new(0.0, RhythmStatus::Inconclusive, 0.0)
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn status(&self) -> RhythmStatus {
        self.status
    }

    pub fn variation_percent(&self) -> f64 {
        self.variation_percent
    }
}

/// Intermediate values observed while producing an [`AnalysisResult`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisDetail {
    /// Sample rate after decimation, in Hz.
    pub effective_rate_hz: f64,
    pub decimation_factor: usize,
    /// Length of the analysed envelope in seconds.
    pub duration_seconds: f64,
    pub beat_times_s: Vec<f64>,
    pub intervals_s: Vec<f64>,
}

impl AnalysisDetail {
    pub fn beat_count(&self) -> usize {
        self.beat_times_s.len()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub detail: AnalysisDetail,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn result_rounds_fields() {
        let result = AnalysisResult::new(72.3456, RhythmStatus::Regular, 4.56789);
        assert_abs_diff_eq!(result.bpm(), 72.3, epsilon = 1e-12);
        assert_abs_diff_eq!(result.variation_percent(), 4.57, epsilon = 1e-12);
        assert_eq!(result.status(), RhythmStatus::Regular);
    }

    #[test]
    fn inconclusive_is_zeroed() {
        let result = AnalysisResult::inconclusive();
        assert_eq!(result.bpm(), 0.0);
        assert_eq!(result.variation_percent(), 0.0);
        assert_eq!(result.status(), RhythmStatus::Inconclusive);
    }

    #[test]
    fn result_serializes_external_names() {
        let result = AnalysisResult::new(60.0, RhythmStatus::Irregular, 21.5);
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["bpm"], 60.0);
        assert_eq!(json["status"], "Irregular");
        assert_eq!(json["variation"], 21.5);
    }
}
