use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use solar_finance_core::tariff::{CustomerCategory, Tariff};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn default_vat() -> Decimal {
    solar_finance_core::DEFAULT_VAT
}

fn resolve_tariff(tariff: Option<Tariff>, category: CustomerCategory) -> NapiResult<Tariff> {
    match tariff {
        Some(t) => {
            t.validate().map_err(to_napi_error)?;
            Ok(t)
        }
        None => Tariff::for_category(category).map_err(to_napi_error),
    }
}

// ---------------------------------------------------------------------------
// Tariffs & billing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BillRequest {
    kwh: Decimal,
    #[serde(default)]
    category: CustomerCategory,
    #[serde(default)]
    tariff: Option<Tariff>,
}

/// VAT-exclusive monthly bill for a consumption.
#[napi]
pub fn bill_from_consumption(input_json: String) -> NapiResult<String> {
    let input: BillRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tariff = resolve_tariff(input.tariff, input.category)?;
    let bill = solar_finance_core::billing::bill_from_consumption(input.kwh, &tariff);
    serde_json::to_string(&bill).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ConsumptionRequest {
    bill_with_vat: Decimal,
    #[serde(default)]
    category: CustomerCategory,
    #[serde(default)]
    tariff: Option<Tariff>,
    #[serde(default = "default_vat")]
    vat: Decimal,
}

#[napi]
pub fn consumption_from_bill(input_json: String) -> NapiResult<String> {
    let input: ConsumptionRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tariff = resolve_tariff(input.tariff, input.category)?;
    let kwh = solar_finance_core::billing::consumption_from_bill(input.bill_with_vat, &tariff, input.vat)
        .map_err(to_napi_error)?;
    serde_json::to_string(&kwh).map_err(to_napi_error)
}

#[napi]
pub fn list_provinces() -> NapiResult<String> {
    serde_json::to_string(&solar_finance_core::tariff::PROVINCES[..]).map_err(to_napi_error)
}

#[napi]
pub fn find_province(name: String) -> NapiResult<String> {
    let profile = solar_finance_core::tariff::find_province(&name).map_err(to_napi_error)?;
    serde_json::to_string(profile).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Production & sizing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ProductionRequest {
    capacity_kwp: Decimal,
    annual_yield_per_kwp: Decimal,
    efficiency_pct: Decimal,
    #[serde(default)]
    year_offset: Decimal,
    degradation_rate: Decimal,
}

#[napi]
pub fn monthly_production(input_json: String) -> NapiResult<String> {
    let input: ProductionRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let kwh = solar_finance_core::production::monthly_production(
        input.capacity_kwp,
        input.annual_yield_per_kwp,
        input.efficiency_pct,
        input.year_offset,
        input.degradation_rate,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&kwh).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct SizingRequest {
    monthly_consumption_kwh: Decimal,
    daytime_usage_pct: Decimal,
    province_annual_yield_per_kwp: Decimal,
    safety_ratio_pct: Decimal,
}

#[napi]
pub fn recommended_capacity(input_json: String) -> NapiResult<String> {
    let input: SizingRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let kwp = solar_finance_core::sizing::recommended_capacity(
        input.monthly_consumption_kwh,
        input.daytime_usage_pct,
        input.province_annual_yield_per_kwp,
        input.safety_ratio_pct,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&kwp).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Savings, financing & evaluation
// ---------------------------------------------------------------------------

#[napi]
pub fn project_savings(input_json: String) -> NapiResult<String> {
    let input: solar_finance_core::savings::SavingsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = solar_finance_core::savings::project_savings(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct AmortizeRequest {
    principal: Decimal,
    #[serde(flatten)]
    terms: solar_finance_core::financing::FinancingTerms,
}

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let input: AmortizeRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        solar_finance_core::financing::amortize(&input.terms, input.principal).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn evaluate_investment(input_json: String) -> NapiResult<String> {
    let input: solar_finance_core::evaluation::EvaluationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = solar_finance_core::evaluation::evaluate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_solar(input_json: String) -> NapiResult<String> {
    let input: solar_finance_core::analysis::SolarAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = solar_finance_core::analysis::analyze(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Lead form
// ---------------------------------------------------------------------------

/// Validate a contact-form submission and return the notification text the
/// host should post. Delivery stays on the JavaScript side.
#[napi]
pub fn render_lead_message(input_json: String) -> NapiResult<String> {
    let lead: solar_finance_core::lead::LeadSubmission =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    lead.validate().map_err(to_napi_error)?;
    Ok(lead.render_message())
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[napi]
pub fn format_vnd(amount: String) -> NapiResult<String> {
    let value: Decimal = amount.trim().parse().map_err(to_napi_error)?;
    Ok(solar_finance_core::display::format_vnd_signed(value))
}
