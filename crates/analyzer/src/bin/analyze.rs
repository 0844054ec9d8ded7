use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stetho_analyzer::{load_config, AnalysisJob, HeartSoundPipeline};
use stetho_domain::{exporter_for, AnalysisConfig, ExportFormat};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Text,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => ExportFormat::Json,
            Format::Text => ExportFormat::Text,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate heart rate and rhythm from a heart-sound recording", long_about = None)]
struct Cli {
    /// Path to the audio file to analyse
    input: PathBuf,
    /// YAML or JSON file overriding analysis parameters
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Include effective rate, beat times and intervals in the output
    #[arg(long)]
    detail: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    let pipeline = HeartSoundPipeline::with_config(config)?;
    let job = AnalysisJob {
        audio_path: cli.input,
    };
    let report = pipeline.run(&job)?;

    let format = ExportFormat::from(cli.format);
    let bytes = exporter_for(format).export(&report, format, cli.detail)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes)?;
    if format == ExportFormat::Json {
        writeln!(stdout)?;
    }
    Ok(())
}
