use std::cmp::Ordering;

use tracing::debug;

/// Strictly increasing envelope indices of detected beats.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeakSet {
    indices: Vec<usize>,
}

impl PeakSet {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Peak positions in seconds.
    pub fn times(&self, sample_rate: f64) -> Vec<f64> {
        self.indices
            .iter()
            .map(|&index| index as f64 / sample_rate)
            .collect()
    }
}

/// Local-maximum picker with an adaptive height floor and a refractory
/// distance between beats.
#[derive(Clone, Debug)]
pub struct BeatDetector {
    min_distance_s: f64,
    height_ratio: f64,
}

impl BeatDetector {
    pub fn new(min_distance_s: f64, height_ratio: f64) -> Self {
        Self {
            min_distance_s,
            height_ratio,
        }
    }

    pub fn min_distance(&self, sample_rate: f64) -> usize {
        ((self.min_distance_s * sample_rate).round() as usize).max(1)
    }

    pub fn detect(&self, envelope: &[f64], sample_rate: f64) -> PeakSet {
        let peak = envelope.iter().copied().fold(0.0f64, f64::max);
        let threshold = self.height_ratio * peak;
        let distance = self.min_distance(sample_rate);

        let candidates: Vec<usize> = local_maxima(envelope)
            .into_iter()
            .filter(|&index| envelope[index] >= threshold)
            .collect();
        let indices = enforce_distance(envelope, &candidates, distance);
        debug!(
            candidates = candidates.len(),
            peaks = indices.len(),
            distance,
            threshold,
            "detected beats"
        );
        PeakSet { indices }
    }
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(0.3, 0.3)
    }
}

/// Samples strictly greater than both neighbours. Endpoints never qualify.
fn local_maxima(signal: &[f64]) -> Vec<usize> {
    signal
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Visits candidates tallest first (earlier index wins ties) and drops every
/// remaining candidate closer than `distance` to a kept one.
fn enforce_distance(signal: &[f64], candidates: &[usize], distance: usize) -> Vec<usize> {
    if distance <= 1 || candidates.len() < 2 {
        return candidates.to_vec();
    }
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        signal[candidates[b]]
            .partial_cmp(&signal[candidates[a]])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; candidates.len()];
    for &current in &order {
        if !keep[current] {
            continue;
        }
        let position = candidates[current];
        for left in (0..current).rev() {
            if position - candidates[left] >= distance {
                break;
            }
            keep[left] = false;
        }
        for right in current + 1..candidates.len() {
            if candidates[right] - position >= distance {
                break;
            }
            keep[right] = false;
        }
    }

    candidates
        .iter()
        .zip(keep)
        .filter_map(|(&index, kept)| kept.then_some(index))
        .collect()
}
