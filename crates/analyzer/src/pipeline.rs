use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use stetho_audio::dsp::{downmix, normalized};
use stetho_audio::{AudioDecoder, BandpassFilter, EnvelopeExtractor, FilterSpec, Resampler};
use stetho_domain::{
    AnalysisConfig, AnalysisDetail, AnalysisError, AnalysisReport, AnalysisResult, Waveform,
};

use crate::beats::BeatDetector;
use crate::rhythm::{inter_beat_intervals, RhythmClassifier};

/// A recording on disk to be decoded and analysed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub audio_path: PathBuf,
}

/// Resample, band-pass, envelope, beat picking and rhythm classification.
///
/// Holds only configuration; every call allocates its own buffers, so one
/// pipeline can serve concurrent callers.
#[derive(Clone, Debug)]
pub struct HeartSoundPipeline {
    config: AnalysisConfig,
    resampler: Resampler,
    envelope: EnvelopeExtractor,
    detector: BeatDetector,
    classifier: RhythmClassifier,
}

impl HeartSoundPipeline {
    pub fn new() -> Self {
        Self::build(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: AnalysisConfig) -> Self {
        Self {
            resampler: Resampler::new(config.target_rate_hz, config.anti_alias_order),
            envelope: EnvelopeExtractor::new(config.smoothing_window_s),
            detector: BeatDetector::new(config.min_peak_distance_s, config.peak_height_ratio),
            classifier: RhythmClassifier::new(config.irregular_variation_percent),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, waveform: &Waveform) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_detailed(waveform).map(|report| report.result)
    }

    /// Downmixes interleaved frames before analysis.
    pub fn analyze_interleaved(
        &self,
        samples: &[f32],
        channels: usize,
        sample_rate: u32,
    ) -> Result<AnalysisResult, AnalysisError> {
        let waveform = Waveform::new(downmix(samples, channels)?, sample_rate)?;
        self.analyze(&waveform)
    }

    #[instrument(
        skip(self, waveform),
        fields(sample_rate = waveform.sample_rate(), samples = waveform.len())
    )]
    pub fn analyze_detailed(&self, waveform: &Waveform) -> Result<AnalysisReport, AnalysisError> {
        let samples = normalized(waveform)?;
        let resampled = self.resampler.process(&samples, waveform.sample_rate())?;
        let rate = resampled.sample_rate;

        let bandpass = BandpassFilter::design(FilterSpec {
            order: self.config.filter_order,
            low_hz: self.config.low_cutoff_hz,
            high_hz: self.config.high_cutoff_hz,
            sample_rate: rate,
        })?;
        debug!(
            sections = bandpass.sos().sections().len(),
            low_hz = bandpass.spec().low_hz,
            high_hz = bandpass.spec().high_hz,
            "band-pass designed"
        );
        let filtered = bandpass.process(&resampled.samples);
        let envelope = self.envelope.extract(&filtered, rate)?;

        let peaks = self.detector.detect(&envelope, rate);
        let result = self.classifier.classify(&peaks, envelope.len(), rate);
        info!(
            bpm = result.bpm(),
            status = %result.status(),
            variation = result.variation_percent(),
            beats = peaks.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            result,
            detail: AnalysisDetail {
                effective_rate_hz: rate,
                decimation_factor: resampled.factor,
                duration_seconds: envelope.len() as f64 / rate,
                beat_times_s: peaks.times(rate),
                intervals_s: inter_beat_intervals(&peaks, rate),
            },
        })
    }

    /// Decodes the job's file and analyses it.
    #[instrument(skip(self))]
    pub fn run(&self, job: &AnalysisJob) -> Result<AnalysisReport> {
        info!("loading audio path={}", job.audio_path.display());
        let audio = AudioDecoder::open(&job.audio_path)?;
        let waveform = audio
            .to_waveform()
            .with_context(|| format!("prepare {:?}", job.audio_path))?;
        let report = self
            .analyze_detailed(&waveform)
            .with_context(|| format!("analyze {:?}", job.audio_path))?;
        Ok(report)
    }
}

/// Reads an analysis config, parsed as JSON for a `.json` extension and as
/// YAML otherwise.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        AnalysisConfig::from_json_str(&text)
    } else {
        AnalysisConfig::from_yaml_str(&text)
    };
    config.with_context(|| format!("parse config {:?}", path))
}

impl Default for HeartSoundPipeline {
    fn default() -> Self {
        Self::new()
    }
}
