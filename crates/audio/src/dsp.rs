use stetho_domain::{AnalysisError, Waveform};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakLevel {
    pub max: f64,
    pub min: f64,
}

impl PeakLevel {
    pub fn silence() -> Self {
        Self { max: 0.0, min: 0.0 }
    }

    pub fn measure(buffer: &[f64]) -> Self {
        let mut peak = Self::silence();
        for sample in buffer {
            peak.max = peak.max.max(*sample);
            peak.min = peak.min.min(*sample);
        }
        peak
    }

    /// Largest absolute sample value.
    pub fn magnitude(&self) -> f64 {
        self.max.abs().max(self.min.abs())
    }
}

/// Collapses interleaved frames to mono by averaging the channels of each frame.
pub fn downmix(interleaved: &[f32], channels: usize) -> Result<Vec<f64>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::malformed("channel count must be positive"));
    }
    if interleaved.len() % channels != 0 {
        return Err(AnalysisError::malformed(format!(
            "{} samples do not form whole frames of {} channels",
            interleaved.len(),
            channels
        )));
    }
    if channels == 1 {
        return Ok(interleaved.iter().map(|&s| s as f64).collect());
    }
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() / channels as f64)
        .collect())
}

/// Scales the buffer so its largest absolute sample becomes 1.0.
pub fn normalize_buffer(buffer: &mut [f64]) -> Result<PeakLevel, AnalysisError> {
    let peak = PeakLevel::measure(buffer);
    let gain = peak.magnitude();
    if gain == 0.0 {
        return Err(AnalysisError::DegenerateSignal);
    }
    for sample in buffer.iter_mut() {
        *sample /= gain;
    }
    Ok(peak)
}

/// Returns a normalized copy of the waveform's samples.
pub fn normalized(waveform: &Waveform) -> Result<Vec<f64>, AnalysisError> {
    let mut samples = waveform.samples().to_vec();
    normalize_buffer(&mut samples)?;
    Ok(samples)
}
