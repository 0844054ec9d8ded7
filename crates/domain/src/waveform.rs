use crate::AnalysisError;

/// A single-channel recording together with its sample rate.
///
/// Construction validates the invariants every pipeline stage relies on:
/// at least one sample, every sample finite, and a positive sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    sample_rate: u32,
    samples: Vec<f64>,
}

impl Waveform {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::malformed("sample rate must be positive"));
        }
        if samples.is_empty() {
            return Err(AnalysisError::malformed("waveform contains no samples"));
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::malformed(format!(
                "sample {index} is not finite"
            )));
        }
        Ok(Self {
            sample_rate,
            samples,
        })
    }

    pub fn from_f32(samples: &[f32], sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(samples.iter().map(|&s| s as f64).collect(), sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed waveform; kept for slice-like ergonomics.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
