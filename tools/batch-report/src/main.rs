use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stetho_analyzer::{load_config, AnalysisJob, HeartSoundPipeline};
use stetho_domain::{AnalysisConfig, AnalysisResult, RhythmStatus};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Analyse labelled heart-sound recordings and report agreement"
)]
struct Args {
    /// JSON manifest: a list of {"path": ..., "expected": "Regular"} records
    manifest: PathBuf,
    /// YAML or JSON file overriding analysis parameters
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ManifestRecord {
    path: PathBuf,
    #[serde(default)]
    expected: Option<RhythmStatus>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
struct Summary {
    analysed: usize,
    failed: usize,
    labelled: usize,
    agreed: usize,
}

impl Summary {
    fn record(&mut self, expected: Option<RhythmStatus>, outcome: Option<&AnalysisResult>) {
        let Some(result) = outcome else {
            self.failed += 1;
            return;
        };
        self.analysed += 1;
        if let Some(expected) = expected {
            self.labelled += 1;
            if expected == result.status() {
                self.agreed += 1;
            }
        }
    }

    fn agreement(&self) -> Option<f64> {
        (self.labelled > 0).then(|| self.agreed as f64 / self.labelled as f64)
    }
}

/// Relative paths in the manifest are resolved against its directory.
fn resolve(manifest: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    manifest
        .parent()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|| path.to_path_buf())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    let pipeline = HeartSoundPipeline::with_config(config)?;

    let file = File::open(&args.manifest)
        .with_context(|| format!("open manifest {:?}", args.manifest))?;
    let records: Vec<ManifestRecord> = serde_json::from_reader(BufReader::new(file))?;
    info!(count = records.len(), "loaded manifest");

    let mut summary = Summary::default();
    for record in records {
        let job = AnalysisJob {
            audio_path: resolve(&args.manifest, &record.path),
        };
        match pipeline.run(&job) {
            Ok(report) => {
                info!(
                    path = %job.audio_path.display(),
                    bpm = report.result.bpm(),
                    status = %report.result.status(),
                    "analysed"
                );
                summary.record(record.expected, Some(&report.result));
            }
            Err(err) => {
                warn!(path = %job.audio_path.display(), "analysis failed: {err:#}");
                summary.record(record.expected, None);
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    if let Some(agreement) = summary.agreement() {
        println!("Status agreement: {:.1}%", agreement * 100.0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_agreement_and_failures() {
        let mut summary = Summary::default();
        let regular = AnalysisResult::new(62.0, RhythmStatus::Regular, 3.0);
        summary.record(Some(RhythmStatus::Regular), Some(&regular));
        summary.record(Some(RhythmStatus::Irregular), Some(&regular));
        summary.record(None, Some(&AnalysisResult::inconclusive()));
        summary.record(Some(RhythmStatus::Regular), None);
        assert_eq!(
            summary,
            Summary {
                analysed: 3,
                failed: 1,
                labelled: 2,
                agreed: 1,
            }
        );
        assert_eq!(summary.agreement(), Some(0.5));
    }

    #[test]
    fn manifest_paths_resolve_against_manifest_dir() {
        let manifest = Path::new("/data/set/manifest.json");
        assert_eq!(
            resolve(manifest, Path::new("a.wav")),
            PathBuf::from("/data/set/a.wav")
        );
        assert_eq!(
            resolve(manifest, Path::new("/abs/b.wav")),
            PathBuf::from("/abs/b.wav")
        );
    }

    #[test]
    fn manifest_records_parse() {
        let records: Vec<ManifestRecord> = serde_json::from_str(
            r#"[{"path": "a.wav", "expected": "Irregular"}, {"path": "b.wav"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].expected, Some(RhythmStatus::Irregular));
        assert_eq!(records[1].expected, None);
    }
}
