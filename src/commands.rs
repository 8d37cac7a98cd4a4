//! CLI command implementations.
//!
//! - **analyze**: load, clean, score, cluster, and report on a cohort
//! - **generate**: emit a seeded synthetic cohort for demos and testing

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;

use crate::config::{AnalysisConfig, KChoice};
use crate::io::output::{JsonWriter, OutputFormat, OutputWriter, TerminalWriter};
use crate::io::{clean_records, generate_cohort, load_records, write_csv_tables, write_records};
use crate::pipeline;

pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub k: Option<KChoice>,
    pub seed: Option<u64>,
    pub top_n: Option<usize>,
}

pub fn analyze(options: AnalyzeOptions) -> anyhow::Result<()> {
    let config = resolve_config(&options)?;

    let records = load_records(&options.input)
        .with_context(|| format!("failed to load cohort from {}", options.input.display()))?;
    let cleaned = clean_records(&records, &config.cleaning);
    let analysis = pipeline::run(&cleaned, &config)?;

    match options.format {
        OutputFormat::Csv => {
            let dir = options.output.unwrap_or_else(|| PathBuf::from("reports"));
            write_csv_tables(&analysis, &dir)?;
            info!("wrote CSV tables to {}", dir.display());
        }
        format => {
            let sink = open_sink(options.output.as_deref())?;
            let mut writer: Box<dyn OutputWriter> = match format {
                OutputFormat::Json => Box::new(JsonWriter::new(sink)),
                _ => Box::new(TerminalWriter::new(sink)),
            };
            writer.write_report(&analysis)?;
        }
    }
    Ok(())
}

pub fn generate(output: &Path, count: usize, missing_rate: f64, seed: u64) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&missing_rate) {
        anyhow::bail!("missing rate must be between 0 and 1, got {missing_rate}");
    }
    let cohort = generate_cohort(count, missing_rate, seed);
    write_records(&cohort, output)
        .with_context(|| format!("failed to write cohort to {}", output.display()))?;
    info!("wrote {count} synthetic hospitals to {}", output.display());
    Ok(())
}

/// File configuration with command-line overrides folded in.
fn resolve_config(options: &AnalyzeOptions) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &options.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(k) = options.k {
        config.cluster.k = k;
    }
    if let Some(seed) = options.seed {
        config.cluster.seed = seed;
    }
    if let Some(top_n) = options.top_n {
        config.top_n = top_n;
    }
    Ok(config)
}

fn open_sink(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    })
}
