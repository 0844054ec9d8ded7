#![allow(dead_code)]

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct BurstTrain {
    pub sample_rate: u32,
    pub duration_s: f64,
    pub tone_hz: f64,
    pub burst_width_s: f64,
    pub amplitude: f64,
    pub noise: f64,
    pub seed: u64,
}

impl BurstTrain {
    pub fn new(sample_rate: u32, duration_s: f64) -> Self {
        Self {
            sample_rate,
            duration_s,
            tone_hz: 80.0,
            burst_width_s: 0.1,
            amplitude: 1.0,
            noise: 0.02,
            seed: 7,
        }
    }

    /// Hann-windowed tone bursts centred on `beat_times` over uniform noise.
    pub fn render(&self, beat_times: &[f64]) -> Vec<f64> {
        let fs = self.sample_rate as f64;
        let len = (fs * self.duration_s).round() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut samples: Vec<f64> = (0..len)
            .map(|_| self.noise * rng.gen_range(-1.0..1.0))
            .collect();

        let half = (self.burst_width_s * fs / 2.0).round() as i64;
        for &time in beat_times {
            let centre = (time * fs).round() as i64;
            for k in -half..=half {
                let index = centre + k;
                if index < 0 || index >= len as i64 {
                    continue;
                }
                let window = 0.5 * (1.0 + (PI * k as f64 / half as f64).cos());
                let tone = (2.0 * PI * self.tone_hz * k as f64 / fs).sin();
                samples[index as usize] += self.amplitude * window * tone;
            }
        }
        samples
    }
}

/// Beat times starting at `first` and separated by `intervals`.
pub fn beat_times(first: f64, intervals: &[f64]) -> Vec<f64> {
    let mut times = vec![first];
    for interval in intervals {
        let last = *times.last().unwrap();
        times.push(last + interval);
    }
    times
}

/// `count` beats one `period` apart, starting half a period in.
pub fn steady_beats(count: usize, period: f64) -> Vec<f64> {
    (0..count).map(|i| period / 2.0 + i as f64 * period).collect()
}

/// `count` intervals alternating between a short draw in [0.5, 0.7) s and a
/// long draw in [1.2, 1.5) s, starting with a short one.
pub fn alternating_intervals(seed: u64, count: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            if i % 2 == 0 {
                rng.gen_range(0.5..0.7)
            } else {
                rng.gen_range(1.2..1.5)
            }
        })
        .collect()
}

/// Population coefficient of variation, in percent.
pub fn cv_percent(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean * 100.0
}
