use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Tunable constants of the analysis pipeline.
///
/// `Default` reproduces the reference parameters; partial documents only need
/// to name the fields they override.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Working rate the resampler decimates toward.
    pub target_rate_hz: u32,
    /// Butterworth band-pass order (per edge, as in the prototype low-pass).
    pub filter_order: usize,
    pub low_cutoff_hz: f64,
    pub high_cutoff_hz: f64,
    /// Order of the low-pass applied before decimation.
    pub anti_alias_order: usize,
    pub smoothing_window_s: f64,
    /// Minimum spacing between beats; 0.3 s caps detection at 200 BPM.
    pub min_peak_distance_s: f64,
    /// Peak height threshold as a fraction of the envelope maximum.
    pub peak_height_ratio: f64,
    /// Interval variation above which a rhythm is irregular.
    pub irregular_variation_percent: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_rate_hz: 2_000,
            filter_order: 4,
            low_cutoff_hz: 20.0,
            high_cutoff_hz: 150.0,
            anti_alias_order: 8,
            smoothing_window_s: 0.05,
            min_peak_distance_s: 0.3,
            peak_height_ratio: 0.3,
            irregular_variation_percent: 15.0,
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, AnalysisError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|err| AnalysisError::config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, AnalysisError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| AnalysisError::config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that are independent of the recording. Cutoffs versus
    /// the effective sample rate are checked at filter design time.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.target_rate_hz == 0 {
            return Err(AnalysisError::config("target_rate_hz must be positive"));
        }
        if !(self.low_cutoff_hz > 0.0 && self.low_cutoff_hz < self.high_cutoff_hz) {
            return Err(AnalysisError::config(
                "cutoffs must satisfy 0 < low_cutoff_hz < high_cutoff_hz",
            ));
        }
        for (name, order) in [
            ("filter_order", self.filter_order),
            ("anti_alias_order", self.anti_alias_order),
        ] {
            if order == 0 || order % 2 != 0 {
                return Err(AnalysisError::config(format!(
                    "{name} must be a positive even number, got {order}"
                )));
            }
        }
        for (name, value) in [
            ("smoothing_window_s", self.smoothing_window_s),
            ("min_peak_distance_s", self.min_peak_distance_s),
            ("peak_height_ratio", self.peak_height_ratio),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalysisError::config(format!("{name} must be positive")));
            }
        }
        if self.peak_height_ratio > 1.0 {
            return Err(AnalysisError::config("peak_height_ratio cannot exceed 1"));
        }
        if !(self.irregular_variation_percent.is_finite() && self.irregular_variation_percent >= 0.0)
        {
            return Err(AnalysisError::config(
                "irregular_variation_percent must be non-negative",
            ));
        }
        Ok(())
    }
}
