//! Portfolio risk decomposition CLI tool.
//!
//! Reads a long-format CSV of asset and factor returns, fits the factor
//! model and prints the risk decomposition of a portfolio.
//!
//! Usage: `cargo run --features cli --bin decompose -- returns.csv [--weight AAPL=0.6 ...]`

use std::{fs, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use hobart::{
    data::{infer_factor_names, read_csv},
    model::{RiskModel, RiskModelConfig},
    primitives::{FactorName, PortfolioWeights, Symbol},
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "decompose")]
#[command(about = "Decompose portfolio risk into factor and specific parts", long_about = None)]
#[command(version)]
struct Cli {
    /// Long-format CSV with date, asset, return and factor_<name> columns
    input: PathBuf,

    /// Factors to use, comma separated (default: every factor_ column)
    #[arg(long, value_delimiter = ',')]
    factors: Vec<String>,

    /// Portfolio weight as ASSET=WEIGHT, repeated per asset (default: equal weight)
    #[arg(long = "weight", value_parser = parse_weight)]
    weights: Vec<(String, f64)>,

    /// JSON model configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => RiskModelConfig::default(),
    };

    let df = read_csv(&cli.input)?;

    let prefix = config.panel.factor_prefix.clone();
    if let Some(names) =
        select_factors(&cli.factors, cli.config.is_some(), || infer_factor_names(&df, &prefix))
    {
        config.panel.factor_names = names;
    }

    let weights = (!cli.weights.is_empty()).then(|| {
        let (assets, weights): (Vec<Symbol>, Vec<f64>) =
            cli.weights.iter().map(|(asset, w)| (Symbol::new(asset.as_str()), *w)).unzip();
        PortfolioWeights::new(assets, weights.into())
    });

    let report = RiskModel::with_config(config).run_frame(&df, weights.as_ref())?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_summary();
    }

    Ok(())
}

/// Factor list to use, or `None` to keep the configured one.
///
/// `--factors` wins; otherwise a config file's list is kept; otherwise every
/// factor column of the input is used.
fn select_factors(
    requested: &[String],
    has_config: bool,
    inferred: impl FnOnce() -> Vec<FactorName>,
) -> Option<Vec<FactorName>> {
    if !requested.is_empty() {
        Some(requested.iter().map(FactorName::new).collect())
    } else if has_config {
        None
    } else {
        Some(inferred())
    }
}

fn parse_weight(s: &str) -> Result<(String, f64), String> {
    let (asset, weight) =
        s.split_once('=').ok_or_else(|| format!("expected ASSET=WEIGHT, got '{s}'"))?;
    let weight: f64 =
        weight.trim().parse().map_err(|_| format!("invalid weight '{weight}' for {asset}"))?;
    if !weight.is_finite() {
        return Err(format!("weight for {asset} must be finite"));
    }
    Ok((asset.trim().to_string(), weight))
}
