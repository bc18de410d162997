mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use solar_finance_core::types::Assumptions;

use commands::analysis::AnalyzeArgs;
use commands::financing::{AmortizeArgs, EvaluateArgs};
use commands::solar::{ProductionArgs, SavingsArgs, SizeArgs};
use commands::tariff::{BillArgs, ConsumptionArgs, ProvincesArgs};

/// Rooftop solar sizing and investment calculations
#[derive(Parser)]
#[command(
    name = "solarfin",
    version,
    about = "Rooftop solar sizing and investment calculations",
    long_about = "A CLI for sizing rooftop solar systems and evaluating the investment \
                  with decimal precision. Supports tiered electricity billing, bill \
                  inversion, production with degradation, lifetime savings, installment \
                  loan schedules, and ROI / IRR / payback."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// JSON/YAML file overriding the default modelling assumptions
    #[arg(long, global = true)]
    assumptions: Option<String>,

    /// Log calculation steps to stderr (RUST_LOG overrides the filter)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly electricity bill for a consumption
    Bill(BillArgs),
    /// Estimate monthly consumption from a bill
    Consumption(ConsumptionArgs),
    /// Expected monthly production of a system
    Production(ProductionArgs),
    /// Recommended system capacity for a province
    Size(SizeArgs),
    /// Lifetime savings projection
    Savings(SavingsArgs),
    /// Installment loan amortization schedule
    Amortize(AmortizeArgs),
    /// ROI, IRR and payback for a savings projection
    Evaluate(EvaluateArgs),
    /// Bill to sizing, savings and returns in one run
    Analyze(AnalyzeArgs),
    /// Province solar resource table
    Provinces(ProvincesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    if !verbose {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("solar_finance_core=debug,solarfin=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_assumptions(path: Option<&str>) -> Result<Option<Assumptions>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let assumptions: Assumptions = input::file::read_input(path)?;
    assumptions.validate()?;
    tracing::debug!(path, "loaded assumptions");
    Ok(Some(assumptions))
}

/// Runs the selected command. `None` when it printed its own output.
fn run(cli: Cli) -> Result<Option<serde_json::Value>, Box<dyn std::error::Error>> {
    let overrides = load_assumptions(cli.assumptions.as_deref())?;
    let defaults = Assumptions::default();
    let assumptions = overrides.as_ref().unwrap_or(&defaults);

    let value = match cli.command {
        Commands::Bill(args) => commands::tariff::run_bill(args, assumptions),
        Commands::Consumption(args) => commands::tariff::run_consumption(args, assumptions),
        Commands::Production(args) => commands::solar::run_production(args, assumptions),
        Commands::Size(args) => commands::solar::run_size(args),
        Commands::Savings(args) => commands::solar::run_savings(args, overrides.as_ref()),
        Commands::Amortize(args) => commands::financing::run_amortize(args),
        Commands::Evaluate(args) => commands::financing::run_evaluate(args),
        Commands::Analyze(args) => commands::analysis::run_analyze(args, overrides.as_ref()),
        Commands::Provinces(args) => commands::tariff::run_provinces(args),
        Commands::Version => {
            println!("solarfin {}", env!("CARGO_PKG_VERSION"));
            return Ok(None);
        }
    }?;
    Ok(Some(value))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = cli.output.clone();
    match run(cli) {
        Ok(Some(value)) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
