use ndarray::Array1;
use tracing::debug;

use stetho_domain::{AnalysisResult, RhythmStatus};

use crate::beats::PeakSet;

/// Consecutive differences of beat times, in seconds.
pub fn inter_beat_intervals(peaks: &PeakSet, sample_rate: f64) -> Vec<f64> {
    peaks
        .times(sample_rate)
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect()
}

/// Population coefficient of variation of the intervals, as a percentage.
pub fn variation_percent(intervals: &[f64]) -> f64 {
    if intervals.len() < 2 {
        return 0.0;
    }
    let intervals = Array1::from(intervals.to_vec());
    let mean = intervals.mean().unwrap_or(0.0);
    if mean <= 0.0 {
        return 0.0;
    }
    100.0 * intervals.std(0.0) / mean
}

#[derive(Clone, Debug)]
pub struct RhythmClassifier {
    irregular_threshold_percent: f64,
}

impl RhythmClassifier {
    pub fn new(irregular_threshold_percent: f64) -> Self {
        Self {
            irregular_threshold_percent,
        }
    }

    /// Rate is beats per analysed duration, so edge gaps lower the estimate
    /// the same way for every recording length.
    ///
    /// The threshold is compared against the unrounded variation. A result
    /// reported as exactly the threshold can therefore still be `Irregular`.
    pub fn classify(&self, peaks: &PeakSet, envelope_len: usize, sample_rate: f64) -> AnalysisResult {
        if peaks.len() < 2 || envelope_len == 0 {
            debug!(beats = peaks.len(), "not enough beats for a rhythm estimate");
            return AnalysisResult::inconclusive();
        }
        let duration = envelope_len as f64 / sample_rate;
        let bpm = peaks.len() as f64 / duration * 60.0;
        let variation = variation_percent(&inter_beat_intervals(peaks, sample_rate));
        let status = if variation > self.irregular_threshold_percent {
            RhythmStatus::Irregular
        } else {
            RhythmStatus::Regular
        };
        debug!(bpm, variation, %status, "classified rhythm");
        AnalysisResult::new(bpm, status, variation)
    }
}

impl Default for RhythmClassifier {
    fn default() -> Self {
        Self::new(15.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn peaks(indices: &[usize]) -> PeakSet {
        let mut envelope = vec![0.0; indices.last().map_or(0, |last| last + 2)];
        for &index in indices {
            envelope[index] = 1.0;
        }
        crate::beats::BeatDetector::new(0.0, 0.5).detect(&envelope, 1.0)
    }

    #[test]
    fn fewer_than_two_beats_is_inconclusive() {
        let classifier = RhythmClassifier::default();
        assert_eq!(
            classifier.classify(&PeakSet::default(), 1_000, 100.0),
            AnalysisResult::inconclusive()
        );
        let single = classifier.classify(&peaks(&[50]), 1_000, 100.0);
        assert_eq!(single.status(), RhythmStatus::Inconclusive);
        assert_eq!(single.bpm(), 0.0);
    }

    #[test]
    fn steady_beats_are_regular() {
        // 10 beats over 10 seconds at 100 Hz.
        let indices: Vec<usize> = (0..10).map(|i| 50 + i * 100).collect();
        let result = RhythmClassifier::default().classify(&peaks(&indices), 1_000, 100.0);
        assert_abs_diff_eq!(result.bpm(), 60.0);
        assert_eq!(result.variation_percent(), 0.0);
        assert_eq!(result.status(), RhythmStatus::Regular);
    }

    #[test]
    fn single_interval_has_no_variation() {
        let result = RhythmClassifier::default().classify(&peaks(&[10, 90]), 200, 100.0);
        assert_eq!(result.variation_percent(), 0.0);
        assert_abs_diff_eq!(result.bpm(), 60.0);
    }

    #[test]
    fn variable_beats_are_irregular() {
        // intervals 0.5 s and 1.0 s alternate: cv = 0.25 / 0.75
        let result =
            RhythmClassifier::default().classify(&peaks(&[10, 60, 160, 210, 310]), 400, 100.0);
        assert_eq!(result.status(), RhythmStatus::Irregular);
        assert_abs_diff_eq!(result.variation_percent(), 33.33, epsilon = 1e-9);
        assert_abs_diff_eq!(result.bpm(), 75.0);
    }

    #[test]
    fn variation_equal_to_threshold_is_regular() {
        let set = peaks(&[10, 95, 210]);
        let variation = variation_percent(&inter_beat_intervals(&set, 100.0));
        assert_abs_diff_eq!(variation, 15.0, epsilon = 1e-9);
        let result = RhythmClassifier::new(variation).classify(&set, 300, 100.0);
        assert_eq!(result.status(), RhythmStatus::Regular);
        let result = RhythmClassifier::new(variation - 0.01).classify(&set, 300, 100.0);
        assert_eq!(result.status(), RhythmStatus::Irregular);
    }

    #[test]
    fn threshold_uses_unrounded_variation() {
        // intervals 42498 and 57502 samples: cv = 7502 / 50000
        let set = peaks(&[10, 42_508, 100_010]);
        let variation = variation_percent(&inter_beat_intervals(&set, 1.0));
        assert_abs_diff_eq!(variation, 15.004, epsilon = 1e-9);
        let result = RhythmClassifier::default().classify(&set, 100_012, 1.0);
        assert_eq!(result.variation_percent(), 15.0);
        assert_eq!(result.status(), RhythmStatus::Irregular);
    }
}
