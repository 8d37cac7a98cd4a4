use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::KChoice;

#[derive(Parser, Debug)]
#[command(name = "carescore")]
#[command(about = "Hospital quality scoring and clustering pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score, rate, rank, and cluster a hospital cohort
    Analyze {
        /// Cohort CSV with hospital_id, name, state and the four raw
        /// metric columns
        input: PathBuf,

        /// TOML configuration file; missing keys use their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file for json/terminal (defaults to stdout); output
        /// directory for csv (defaults to ./reports)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cluster count, or "auto" for the silhouette recommendation
        #[arg(short, long)]
        k: Option<KChoice>,

        /// Seed for the centroid algorithm's random initialization
        #[arg(long)]
        seed: Option<u64>,

        /// Size of the national top/bottom extracts
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Generate a seeded synthetic cohort CSV
    Generate {
        /// Where to write the cohort
        output: PathBuf,

        /// Number of hospitals to generate
        #[arg(short = 'n', long, default_value = "500")]
        count: usize,

        /// Probability that any single metric value is left blank
        #[arg(long, default_value = "0.0")]
        missing_rate: f64,

        /// Generator seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Terminal,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
            OutputFormat::Csv => crate::io::output::OutputFormat::Csv,
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
        }
    }
}
