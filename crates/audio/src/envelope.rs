use realfft::RealFftPlanner;
use rustfft::{num_complex::Complex64, FftPlanner};
use tracing::debug;

use stetho_domain::AnalysisError;

/// Magnitude of the analytic signal, computed with an FFT over the whole
/// buffer (one-sided spectrum doubled, negative frequencies zeroed).
pub fn analytic_magnitude(signal: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    let n = signal.len();
    if n < 2 {
        return Ok(signal.iter().map(|s| s.abs()).collect());
    }

    let mut real_planner = RealFftPlanner::<f64>::new();
    let forward = real_planner.plan_fft_forward(n);
    let mut input = signal.to_vec();
    let mut spectrum = forward.make_output_vec();
    forward
        .process(&mut input, &mut spectrum)
        .map_err(|err| AnalysisError::Transform(err.to_string()))?;

    let mut analytic = vec![Complex64::new(0.0, 0.0); n];
    analytic[0] = spectrum[0];
    for k in 1..(n + 1) / 2 {
        analytic[k] = spectrum[k] * 2.0;
    }
    if n % 2 == 0 {
        analytic[n / 2] = spectrum[n / 2];
    }

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(n).process(&mut analytic);
    let scale = 1.0 / n as f64;
    Ok(analytic.iter().map(|c| c.norm() * scale).collect())
}

/// Centered moving average. Near the edges the mean is taken over the samples
/// that exist, so the first `window / 2` and last `(window - 1) / 2` outputs
/// use a shorter window instead of zero padding.
pub fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let n = signal.len();
    let window = window.max(1);
    if window == 1 || n == 0 {
        return signal.to_vec();
    }
    let before = window / 2;
    let after = (window - 1) / 2;

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut running = 0.0;
    for value in signal {
        running += value;
        prefix.push(running);
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after + 1).min(n);
            (prefix[hi] - prefix[lo]) / (hi - lo) as f64
        })
        .collect()
}

/// Smoothed amplitude envelope of a band-limited signal.
#[derive(Clone, Debug)]
pub struct EnvelopeExtractor {
    window_s: f64,
}

impl EnvelopeExtractor {
    pub fn new(window_s: f64) -> Self {
        Self { window_s }
    }

    pub fn window_len(&self, sample_rate: f64) -> usize {
        ((self.window_s * sample_rate).round() as usize).max(1)
    }

    pub fn extract(&self, filtered: &[f64], sample_rate: f64) -> Result<Vec<f64>, AnalysisError> {
        let raw = analytic_magnitude(filtered)?;
        let window = self.window_len(sample_rate);
        debug!(window, samples = raw.len(), "smoothing envelope");
        Ok(moving_average(&raw, window))
    }
}

impl Default for EnvelopeExtractor {
    fn default() -> Self {
        Self::new(0.05)
    }
}
