use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use solar_finance_core::evaluation::{self, EvaluationInput};
use solar_finance_core::financing::{self, FinancingTerms};

use super::load_input;

#[derive(Deserialize)]
struct AmortizeRequest {
    principal: Decimal,
    term_years: u32,
    #[serde(default)]
    annual_interest_rate_pct: Option<Decimal>,
}

/// Arguments for the installment loan schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount financed, in VND
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Annual interest rate in percent (defaults to the standard rate for the term)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Print only the yearly rollup
    #[arg(long)]
    pub yearly: bool,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: AmortizeRequest = match load_input(args.input.as_deref())? {
        Some(request) => request,
        None => AmortizeRequest {
            principal: args.principal.ok_or("--principal is required (or provide --input)")?,
            term_years: args.term_years.ok_or("--term-years is required (or provide --input)")?,
            annual_interest_rate_pct: args.rate,
        },
    };

    let terms = FinancingTerms {
        installment_share_pct: Decimal::ONE_HUNDRED,
        term_years: request.term_years,
        annual_interest_rate_pct: request.annual_interest_rate_pct,
    };
    let result = financing::amortize(&terms, request.principal)?;
    let mut value = serde_json::to_value(result)?;
    if args.yearly {
        if let Some(schedule) = value.get_mut("result").and_then(Value::as_object_mut) {
            schedule.remove("periods");
        }
    }
    Ok(value)
}

/// Arguments for ROI / IRR / payback evaluation
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let eval_input: EvaluationInput = load_input(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for evaluation")?;
    let result = evaluation::evaluate(&eval_input)?;
    Ok(serde_json::to_value(result)?)
}
