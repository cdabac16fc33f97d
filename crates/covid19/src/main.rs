use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use covid19_core::{classify_country, pipeline, Metric, PipelineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod display;

const DATA_DIR_VAR: &str = "COVID19_DATA_DIR";
const OUTPUT_DIR_VAR: &str = "COVID19_OUTPUT_DIR";

#[derive(Parser, Debug)]
#[command(author, version, about = "COVID-19 time-series preprocessing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the enriched table, rollups and global aggregate
    Process(ProcessArgs),
    /// Print the continent assigned to each country name
    Classify {
        #[arg(required = true)]
        countries: Vec<String>,
    },
}

#[derive(Args, Debug, Default)]
struct ProcessArgs {
    /// TOML file with pipeline settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the lookup table and the time-series folder
    #[arg(long)]
    source_dir: Option<PathBuf>,
    /// Where outputs are written (defaults to the source directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Keep cruise ship records instead of dropping them
    #[arg(long)]
    keep_cruise: bool,
    /// Metric used for the continent rollup
    #[arg(long)]
    metric: Option<Metric>,
    /// Also write a Parquet copy of the enriched table
    #[arg(long)]
    parquet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Process(args) => {
            dotenvy::dotenv().ok();
            let config = layered_config(&args, |key| std::env::var(key).ok())?;
            let run = pipeline::run(&config).with_context(|| {
                format!("pipeline failed for {}", config.source_dir.display())
            })?;
            info!(output_dir = %run.output_dir.display(), "outputs written");
            display::print_run(&run);
            Ok(())
        }
        Command::Classify { countries } => {
            let rows: Vec<(String, String)> = countries
                .iter()
                .map(|country| (country.clone(), classify_country(country).to_string()))
                .collect();
            display::print_classification(&rows);
            Ok(())
        }
    }
}

/// Defaults, then the TOML file, then environment, then flags.
fn layered_config<F>(args: &ProcessArgs, env: F) -> Result<PipelineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = env(DATA_DIR_VAR).filter(|value| !value.trim().is_empty()) {
        config.source_dir = PathBuf::from(dir);
    }
    if let Some(dir) = env(OUTPUT_DIR_VAR).filter(|value| !value.trim().is_empty()) {
        config.output_dir = Some(PathBuf::from(dir));
    }

    if let Some(dir) = &args.source_dir {
        config.source_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if args.keep_cruise {
        config.remove_cruise = false;
    }
    if let Some(metric) = args.metric {
        config.continent_metric = metric;
    }
    if args.parquet {
        config.write_parquet = true;
    }

    Ok(config)
}
