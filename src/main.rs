use anyhow::Result;
use carescore::cli::{Cli, Commands};
use carescore::commands::{self, AnalyzeOptions};
use clap::Parser;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            input,
            config,
            format,
            output,
            k,
            seed,
            top_n,
        } => commands::analyze(AnalyzeOptions {
            input,
            config,
            format: format.into(),
            output,
            k,
            seed,
            top_n,
        }),
        Commands::Generate {
            output,
            count,
            missing_rate,
            seed,
        } => commands::generate(&output, count, missing_rate, seed),
    }
}
