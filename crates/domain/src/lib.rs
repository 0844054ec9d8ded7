pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod waveform;

pub use crate::analysis::{AnalysisDetail, AnalysisReport, AnalysisResult, RhythmStatus};
pub use crate::config::AnalysisConfig;
pub use crate::error::AnalysisError;
pub use crate::io::{exporter_for, ExportFormat, ResultExporter};
pub use crate::waveform::Waveform;
