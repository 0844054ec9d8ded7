//! Butterworth designs realised as cascaded second-order sections.
//!
//! Designs go through the analog prototype, a band transform, and the
//! bilinear transform with pre-warped edges. Each conjugate pole pair becomes
//! one biquad so no high-order polynomial is ever formed.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use stetho_domain::AnalysisError;

/// One second-order section with `a0` normalised to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 2],
}

impl Biquad {
    fn response(&self, z_inv: Complex64) -> Complex64 {
        let z_inv2 = z_inv * z_inv;
        let num = self.b[0] + z_inv * self.b[1] + z_inv2 * self.b[2];
        let den = 1.0 + z_inv * self.a[0] + z_inv2 * self.a[1];
        num / den
    }
}

/// Parameters of the heart-sound band-pass.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FilterSpec {
    pub order: usize,
    pub low_hz: f64,
    pub high_hz: f64,
    pub sample_rate: f64,
}

impl FilterSpec {
    /// Fourth-order 20-150 Hz band at the given rate.
    pub fn heart_band(sample_rate: f64) -> Self {
        Self {
            order: 4,
            low_hz: 20.0,
            high_hz: 150.0,
            sample_rate,
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        check_order(self.order)?;
        check_rate(self.sample_rate)?;
        let nyquist = self.sample_rate / 2.0;
        if !(self.low_hz > 0.0 && self.low_hz < self.high_hz && self.high_hz < nyquist) {
            return Err(AnalysisError::filter_design(format!(
                "band {}-{} Hz does not fit below the {} Hz Nyquist frequency",
                self.low_hz, self.high_hz, nyquist
            )));
        }
        Ok(())
    }
}

/// A cascade of biquads applied in sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    pub fn butterworth_bandpass(spec: &FilterSpec) -> Result<Self, AnalysisError> {
        spec.validate()?;
        let fs2 = 2.0 * spec.sample_rate;
        let w_low = prewarp(spec.low_hz, spec.sample_rate);
        let w_high = prewarp(spec.high_hz, spec.sample_rate);
        let bandwidth = w_high - w_low;
        let center_sq = w_low * w_high;

        // Each prototype pole p maps to the two roots of s^2 - p*bw*s + w0^2.
        let mut poles = Vec::with_capacity(spec.order);
        for p in upper_prototype_poles(spec.order) {
            let half = p * (bandwidth / 2.0);
            let disc = (half * half - center_sq).sqrt();
            poles.push(half + disc);
            poles.push(half - disc);
        }
        let gain = (bandwidth * fs2).powi(spec.order as i32);
        Ok(Self::from_analog_poles(&poles, [1.0, 0.0, -1.0], gain, fs2))
    }

    pub fn butterworth_lowpass(
        order: usize,
        cutoff_hz: f64,
        sample_rate: f64,
    ) -> Result<Self, AnalysisError> {
        check_order(order)?;
        check_rate(sample_rate)?;
        if !(cutoff_hz > 0.0 && cutoff_hz < sample_rate / 2.0) {
            return Err(AnalysisError::filter_design(format!(
                "low-pass cutoff {cutoff_hz} Hz must lie in (0, {}) Hz",
                sample_rate / 2.0
            )));
        }
        let fs2 = 2.0 * sample_rate;
        let wc = prewarp(cutoff_hz, sample_rate);
        let poles: Vec<Complex64> = upper_prototype_poles(order)
            .into_iter()
            .map(|p| p * wc)
            .collect();
        Ok(Self::from_analog_poles(
            &poles,
            [1.0, 2.0, 1.0],
            wc.powi(order as i32),
            fs2,
        ))
    }

    /// Maps analog poles (one per conjugate pair) through the bilinear
    /// transform. `gain` is the analog gain times the product of `fs2 - zero`
    /// over the finite analog zeros.
    fn from_analog_poles(
        poles: &[Complex64],
        numerator: [f64; 3],
        gain: f64,
        fs2: f64,
    ) -> Self {
        let mut digital_gain = gain;
        let mut sections: Vec<Biquad> = poles
            .iter()
            .map(|&s| {
                digital_gain /= (fs2 - s).norm_sqr();
                let z = (fs2 + s) / (fs2 - s);
                Biquad {
                    b: numerator,
                    a: [-2.0 * z.re, z.norm_sqr()],
                }
            })
            .collect();

        let per_section = digital_gain.powf(1.0 / sections.len() as f64);
        for section in sections.iter_mut() {
            for coeff in section.b.iter_mut() {
                *coeff *= per_section;
            }
        }
        debug!(sections = sections.len(), "designed sos filter");
        Self { sections }
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Causal filtering from zero initial state.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        let mut output = input.to_vec();
        for section in &self.sections {
            let [b0, b1, b2] = section.b;
            let [a1, a2] = section.a;
            let (mut z1, mut z2) = (0.0, 0.0);
            for sample in output.iter_mut() {
                let x = *sample;
                let y = b0 * x + z1;
                z1 = b1 * x - a1 * y + z2;
                z2 = b2 * x - a2 * y;
                *sample = y;
            }
        }
        output
    }

    /// Forward then backward pass; no phase shift, squared magnitude response.
    pub fn apply_zero_phase(&self, input: &[f64]) -> Vec<f64> {
        let mut forward = self.apply(input);
        forward.reverse();
        let mut output = self.apply(&forward);
        output.reverse();
        output
    }

    /// Magnitude of the frequency response at `freq_hz`.
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / sample_rate;
        let z_inv = Complex64::from_polar(1.0, -omega);
        self.sections
            .iter()
            .map(|section| section.response(z_inv))
            .fold(Complex64::new(1.0, 0.0), |acc, h| acc * h)
            .norm()
    }
}

/// The band-pass stage of the pipeline.
#[derive(Clone, Debug)]
pub struct BandpassFilter {
    spec: FilterSpec,
    filter: SosFilter,
}

impl BandpassFilter {
    pub fn design(spec: FilterSpec) -> Result<Self, AnalysisError> {
        let filter = SosFilter::butterworth_bandpass(&spec)?;
        Ok(Self { spec, filter })
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn sos(&self) -> &SosFilter {
        &self.filter
    }

    pub fn process(&self, input: &[f64]) -> Vec<f64> {
        self.filter.apply(input)
    }
}

fn check_order(order: usize) -> Result<(), AnalysisError> {
    if order == 0 || order % 2 != 0 {
        return Err(AnalysisError::filter_design(format!(
            "order {order} is not a positive even number"
        )));
    }
    Ok(())
}

fn check_rate(sample_rate: f64) -> Result<(), AnalysisError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(AnalysisError::filter_design(format!(
            "sample rate {sample_rate} is not positive"
        )));
    }
    Ok(())
}

fn prewarp(freq_hz: f64, sample_rate: f64) -> f64 {
    2.0 * sample_rate * (PI * freq_hz / sample_rate).tan()
}

/// Butterworth prototype poles in the upper-left quadrant of the s-plane.
fn upper_prototype_poles(order: usize) -> Vec<Complex64> {
    (0..order / 2)
        .map(|k| {
            let theta = PI * (2 * k + 1 + order) as f64 / (2 * order) as f64;
            Complex64::from_polar(1.0, theta)
        })
        .collect()
}
