use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use solar_finance_core::production::monthly_production;
use solar_finance_core::savings::{self, SavingsInput};
use solar_finance_core::sizing::recommended_capacity;
use solar_finance_core::tariff::find_province;
use solar_finance_core::types::Assumptions;

use super::load_input;

#[derive(Deserialize)]
struct ProductionRequest {
    capacity_kwp: Decimal,
    #[serde(default)]
    annual_yield_per_kwp: Option<Decimal>,
    #[serde(default = "hundred")]
    efficiency_pct: Decimal,
    #[serde(default)]
    year_offset: Decimal,
}

fn hundred() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Arguments for expected monthly production
#[derive(Args)]
pub struct ProductionArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Installed capacity in kWp
    #[arg(long)]
    pub capacity: Option<Decimal>,

    /// Specific yield in kWh/kWp/year (defaults to the standard yield)
    #[arg(long = "yield")]
    pub annual_yield: Option<Decimal>,

    /// Use this province's yield instead
    #[arg(long, conflicts_with = "annual_yield")]
    pub province: Option<String>,

    /// System efficiency in percent
    #[arg(long, default_value = "100")]
    pub efficiency: Decimal,

    /// Age of the system in years (fractions allowed, e.g. 1.5)
    #[arg(long, default_value = "0")]
    pub year_offset: Decimal,
}

pub fn run_production(
    args: ProductionArgs,
    assumptions: &Assumptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ProductionRequest = match load_input(args.input.as_deref())? {
        Some(request) => request,
        None => {
            let annual_yield_per_kwp = match args.province {
                Some(ref name) => Some(find_province(name)?.annual_yield_per_kwp),
                None => args.annual_yield,
            };
            ProductionRequest {
                capacity_kwp: args.capacity.ok_or("--capacity is required (or provide --input)")?,
                annual_yield_per_kwp,
                efficiency_pct: args.efficiency,
                year_offset: args.year_offset,
            }
        }
    };

    let annual_yield = request
        .annual_yield_per_kwp
        .unwrap_or(assumptions.standard_annual_yield);
    let monthly = monthly_production(
        request.capacity_kwp,
        annual_yield,
        request.efficiency_pct,
        request.year_offset,
        assumptions.degradation_rate,
    )?;

    Ok(json!({
        "result": {
            "capacity_kwp": request.capacity_kwp,
            "annual_yield_per_kwp": annual_yield,
            "year_offset": request.year_offset,
            "monthly_kwh": monthly,
            "annual_kwh": monthly * Decimal::from(12),
        },
        "methodology": "Specific yield x capacity x efficiency, compounded degradation",
        "warnings": [],
    }))
}

#[derive(Deserialize)]
struct SizeRequest {
    monthly_kwh: Decimal,
    province: String,
    #[serde(default = "ninety")]
    daytime_usage_pct: Decimal,
    #[serde(default = "ninety")]
    safety_ratio_pct: Decimal,
}

fn ninety() -> Decimal {
    Decimal::from(90)
}

/// Arguments for system sizing
#[derive(Args)]
pub struct SizeArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly consumption in kWh
    #[arg(long)]
    pub kwh: Option<Decimal>,

    /// Province name or slug
    #[arg(long)]
    pub province: Option<String>,

    /// Share of consumption during daylight, percent
    #[arg(long, default_value = "90")]
    pub daytime: Decimal,

    /// Safety ratio applied to the location yield, percent
    #[arg(long, default_value = "90")]
    pub safety: Decimal,
}

pub fn run_size(args: SizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SizeRequest = match load_input(args.input.as_deref())? {
        Some(request) => request,
        None => SizeRequest {
            monthly_kwh: args.kwh.ok_or("--kwh is required (or provide --input)")?,
            province: args.province.ok_or("--province is required (or provide --input)")?,
            daytime_usage_pct: args.daytime,
            safety_ratio_pct: args.safety,
        },
    };

    let profile = find_province(&request.province)?;
    let kwp = recommended_capacity(
        request.monthly_kwh,
        request.daytime_usage_pct,
        profile.annual_yield_per_kwp,
        request.safety_ratio_pct,
    )?;

    Ok(json!({
        "result": {
            "province": profile.name,
            "annual_yield_per_kwp": profile.annual_yield_per_kwp,
            "monthly_kwh": request.monthly_kwh,
            "recommended_capacity_kwp": kwp,
        },
        "methodology": "Daytime share of annual consumption / location yield x safety ratio",
        "warnings": [],
    }))
}

/// Arguments for the lifetime savings projection
#[derive(Args)]
pub struct SavingsArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_savings(
    args: SavingsArgs,
    assumptions: Option<&Assumptions>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut savings_input: SavingsInput = load_input(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for savings projection")?;
    if let Some(a) = assumptions {
        savings_input.assumptions = a.clone();
    }
    let result = savings::project_savings(&savings_input)?;
    Ok(serde_json::to_value(result)?)
}
