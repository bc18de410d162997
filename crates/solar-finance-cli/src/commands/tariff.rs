use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use solar_finance_core::billing::{bill_from_consumption, consumption_from_bill};
use solar_finance_core::tariff::{find_province, CustomerCategory, Tariff, PROVINCES};
use solar_finance_core::types::{round_vnd, Assumptions};

use super::load_input;

#[derive(Deserialize)]
struct BillRequest {
    kwh: Decimal,
    #[serde(default)]
    category: CustomerCategory,
    /// Custom schedule instead of the category's standard tariff
    #[serde(default)]
    tariff: Option<Tariff>,
}

/// Arguments for the electricity bill calculation
#[derive(Args)]
pub struct BillArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly consumption in kWh
    #[arg(long)]
    pub kwh: Option<Decimal>,

    /// Customer category (residential, commercial_under_6kv, ... or the sinh-hoat style slugs)
    #[arg(long, default_value = "residential")]
    pub category: CustomerCategory,
}

pub fn run_bill(args: BillArgs, assumptions: &Assumptions) -> Result<Value, Box<dyn std::error::Error>> {
    let request: BillRequest = match load_input(args.input.as_deref())? {
        Some(request) => request,
        None => BillRequest {
            kwh: args.kwh.ok_or("--kwh is required (or provide --input)")?,
            category: args.category,
            tariff: None,
        },
    };

    let tariff = match request.tariff {
        Some(t) => {
            t.validate()?;
            t
        }
        None => Tariff::for_category(request.category)?,
    };
    let bill = bill_from_consumption(request.kwh, &tariff);
    let vat = bill * assumptions.vat;

    Ok(json!({
        "result": {
            "kwh": request.kwh,
            "category": request.category,
            "bill_before_vat": round_vnd(bill),
            "vat": round_vnd(vat),
            "bill_with_vat": round_vnd(bill + vat),
        },
        "methodology": "Progressive tier billing (VAT exclusive tiers)",
        "warnings": [],
    }))
}

#[derive(Deserialize)]
struct ConsumptionRequest {
    bill_with_vat: Decimal,
    #[serde(default)]
    category: CustomerCategory,
    #[serde(default)]
    tariff: Option<Tariff>,
}

/// Arguments for estimating consumption from a bill
#[derive(Args)]
pub struct ConsumptionArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly bill including VAT, in VND
    #[arg(long)]
    pub bill: Option<Decimal>,

    /// Customer category
    #[arg(long, default_value = "residential")]
    pub category: CustomerCategory,
}

pub fn run_consumption(
    args: ConsumptionArgs,
    assumptions: &Assumptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ConsumptionRequest = match load_input(args.input.as_deref())? {
        Some(request) => request,
        None => ConsumptionRequest {
            bill_with_vat: args.bill.ok_or("--bill is required (or provide --input)")?,
            category: args.category,
            tariff: None,
        },
    };

    let tariff = match request.tariff {
        Some(t) => {
            t.validate()?;
            t
        }
        None => Tariff::for_category(request.category)?,
    };
    let kwh = consumption_from_bill(request.bill_with_vat, &tariff, assumptions.vat)?;

    Ok(json!({
        "result": {
            "bill_with_vat": request.bill_with_vat,
            "category": request.category,
            "monthly_kwh": kwh,
        },
        "methodology": "Tier-walk bill inversion, partial tier rounded up",
        "warnings": [],
    }))
}

/// Arguments for the province solar table
#[derive(Args)]
pub struct ProvincesArgs {
    /// Show a single province (name or slug, e.g. "ha-noi")
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run_provinces(args: ProvincesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    match args.name {
        Some(name) => {
            let profile = find_province(&name)?;
            Ok(json!({ "result": profile }))
        }
        None => Ok(serde_json::to_value(&PROVINCES[..])?),
    }
}
