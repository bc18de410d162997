use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use solar_finance_core::analysis::{self, SolarAnalysisInput, YieldSource, DEFAULT_COST_PER_KWP};
use solar_finance_core::evaluation::ReturnBasis;
use solar_finance_core::financing::FinancingTerms;
use solar_finance_core::tariff::CustomerCategory;
use solar_finance_core::types::Assumptions;

use super::load_input;

/// Arguments for the end-to-end solar analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Province name or slug
    #[arg(long)]
    pub province: Option<String>,

    /// Monthly bill including VAT, in VND
    #[arg(long)]
    pub bill: Option<Decimal>,

    /// Monthly consumption in kWh (used when no bill is given)
    #[arg(long, conflicts_with = "bill")]
    pub kwh: Option<Decimal>,

    /// Customer category
    #[arg(long, default_value = "residential")]
    pub category: CustomerCategory,

    /// Share of consumption during daylight, percent
    #[arg(long, default_value = "90")]
    pub daytime: Decimal,

    /// Safety ratio applied to the location yield, percent
    #[arg(long, default_value = "90")]
    pub safety: Decimal,

    /// Installed cost per kWp before VAT
    #[arg(long)]
    pub cost_per_kwp: Option<Decimal>,

    /// Evaluate this capacity instead of the recommended one
    #[arg(long)]
    pub capacity: Option<Decimal>,

    /// Share of the investment paid in installments, percent
    #[arg(long, requires = "term_years")]
    pub installment: Option<Decimal>,

    /// Installment loan term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Measure returns against the whole investment rather than the upfront payment
    #[arg(long)]
    pub total_basis: bool,

    /// Estimate production from the province yield rather than the standard yield
    #[arg(long)]
    pub province_yield: bool,
}

pub fn run_analyze(
    args: AnalyzeArgs,
    assumptions: Option<&Assumptions>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut analysis_input: SolarAnalysisInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => {
            let financing = match (args.installment, args.term_years) {
                (Some(share), Some(term)) => Some(FinancingTerms {
                    installment_share_pct: share,
                    term_years: term,
                    annual_interest_rate_pct: None,
                }),
                _ => None,
            };
            SolarAnalysisInput {
                province: args.province.ok_or("--province is required (or provide --input)")?,
                category: args.category,
                monthly_bill_with_vat: args.bill,
                monthly_consumption_kwh: args.kwh,
                daytime_usage_pct: args.daytime,
                safety_ratio_pct: args.safety,
                efficiency_pct: Decimal::ONE_HUNDRED,
                cost_per_kwp: args.cost_per_kwp.unwrap_or(DEFAULT_COST_PER_KWP),
                capacity_kwp: args.capacity,
                financing,
                return_basis: if args.total_basis {
                    ReturnBasis::TotalInvestment
                } else {
                    ReturnBasis::UpfrontPayment
                },
                production_yield: if args.province_yield {
                    YieldSource::Province
                } else {
                    YieldSource::Standard
                },
                assumptions: Assumptions::default(),
            }
        }
    };
    if let Some(a) = assumptions {
        analysis_input.assumptions = a.clone();
    }

    let result = analysis::analyze(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}
