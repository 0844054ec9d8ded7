pub mod beats;
pub mod pipeline;
pub mod rhythm;

pub use beats::{BeatDetector, PeakSet};
pub use pipeline::{load_config, AnalysisJob, HeartSoundPipeline};
pub use rhythm::RhythmClassifier;
