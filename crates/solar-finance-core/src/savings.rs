use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::billing::bill_from_consumption;
use crate::error::SolarFinanceError;
use crate::production::{consumed_fraction, monthly_production};
use crate::tariff::Tariff;
use crate::types::*;
use crate::SolarFinanceResult;

fn default_daytime_usage() -> Percent {
    dec!(100)
}

/// Input for a lifetime savings projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsInput {
    pub system: SystemSpec,
    /// Share of consumption that happens while the panels produce
    #[serde(default = "default_daytime_usage")]
    pub daytime_usage_pct: Percent,
    /// Household consumption before solar, kWh/month
    pub baseline_monthly_kwh: Kwh,
    /// Current bill including VAT; derived from the tariff when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_bill_with_vat: Option<Money>,
    pub tariff: Tariff,
    #[serde(default)]
    pub assumptions: Assumptions,
}

/// One year of the projection. Bills are monthly; energy and savings annual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    /// 0 = first year of operation
    pub year: u32,
    pub production_kwh: Kwh,
    /// Grid consumption displaced by solar over the year
    pub consumption_offset_kwh: Kwh,
    pub grid_bill_before: Money,
    pub grid_bill_after: Money,
    pub monthly_savings: Money,
    /// Bill savings over the year net of maintenance
    pub annual_savings: Money,
    /// Cash flow for the year before any financing
    pub cash_flow: Money,
}

/// Output of a savings projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsProjection {
    pub years: Vec<YearlyProjection>,
    pub total_lifetime_savings: Money,
    pub annual_maintenance_cost: Money,
    pub original_monthly_bill_with_vat: Money,
    pub first_year_monthly_savings: Money,
    /// Share of baseline consumption covered by solar in the first year
    pub self_consumption_share_pct: Percent,
    /// What the household would pay the grid over the lifetime without solar
    pub lifetime_grid_cost_without_solar: Money,
}

/// Project yearly production, bills and savings over the panel lifetime.
///
/// Each year is computed independently from degradation and price inflation
/// raised to that year, at monthly granularity.
pub fn project_savings(
    input: &SavingsInput,
) -> SolarFinanceResult<ComputationOutput<SavingsProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let assumptions = &input.assumptions;

    assumptions.validate()?;
    input.tariff.validate()?;
    check_percent("daytime_usage_pct", input.daytime_usage_pct)?;
    if input.system.cost_per_kwp < Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "cost_per_kwp".into(),
            reason: "Cost per kWp cannot be negative".into(),
        });
    }

    let baseline = input.baseline_monthly_kwh.max(Decimal::ZERO);
    if baseline.is_zero() {
        warnings.push("Baseline consumption is zero; solar cannot offset any grid usage".into());
    }

    let vat_factor = assumptions.vat_factor();
    let original_bill = match input.monthly_bill_with_vat {
        Some(bill) => bill.max(Decimal::ZERO),
        None => bill_from_consumption(baseline, &input.tariff) * vat_factor,
    };

    let capacity = input.system.capacity_kwp;
    let yield_per_kwp = input.system.effective_yield(assumptions);
    let maintenance = input.system.annual_maintenance(assumptions);
    let inflation = Decimal::ONE + assumptions.price_inflation;

    tracing::debug!(
        capacity_kwp = %capacity,
        baseline_kwh = %baseline,
        lifetime = assumptions.lifetime_years,
        "projecting savings"
    );

    let mut years = Vec::with_capacity(assumptions.lifetime_years as usize);
    for year in 0..assumptions.lifetime_years {
        let age = Decimal::from(input.system.install_year) + Decimal::from(year);
        let produced = monthly_production(
            capacity,
            yield_per_kwp,
            input.system.efficiency_pct,
            age,
            assumptions.degradation_rate,
        )?;
        let consumed = consumed_fraction(produced, input.daytime_usage_pct);
        let saved = baseline.min(consumed);
        let remaining = baseline - saved;

        if year == 0 && consumed > baseline && !baseline.is_zero() {
            warnings.push(format!(
                "Daytime solar output exceeds consumption by {} kWh/month; surplus is not credited",
                (consumed - baseline).round_dp(1)
            ));
        }

        let price_factor = inflation.powi(year as i64);
        let bill_before = original_bill * price_factor;
        let bill_after = bill_from_consumption(remaining, &input.tariff) * vat_factor * price_factor;
        let monthly_savings = bill_before - bill_after;
        let annual_savings = monthly_savings * dec!(12) - maintenance;

        years.push(YearlyProjection {
            year,
            production_kwh: produced * dec!(12),
            consumption_offset_kwh: saved * dec!(12),
            grid_bill_before: bill_before,
            grid_bill_after: bill_after,
            monthly_savings,
            annual_savings,
            cash_flow: annual_savings,
        });
    }

    let total_lifetime_savings: Money = years.iter().map(|y| y.annual_savings).sum();
    let lifetime_grid_cost_without_solar: Money =
        years.iter().map(|y| y.grid_bill_before * dec!(12)).sum();
    let first_year_monthly_savings = years.first().map(|y| y.monthly_savings).unwrap_or_default();
    let self_consumption_share_pct = match years.first() {
        Some(first) if !baseline.is_zero() => {
            first.consumption_offset_kwh / dec!(12) / baseline * dec!(100)
        }
        _ => Decimal::ZERO,
    };

    if total_lifetime_savings < Decimal::ZERO {
        warnings.push("Maintenance exceeds bill savings over the lifetime".into());
    }

    let output = SavingsProjection {
        years,
        total_lifetime_savings,
        annual_maintenance_cost: maintenance,
        original_monthly_bill_with_vat: original_bill,
        first_year_monthly_savings,
        self_consumption_share_pct,
        lifetime_grid_cost_without_solar,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Solar Savings Projection (self-consumption, tiered billing, price inflation)",
        serde_json::json!({
            "capacity_kwp": capacity.to_string(),
            "daytime_usage_pct": input.daytime_usage_pct.to_string(),
            "lifetime_years": assumptions.lifetime_years,
            "degradation_rate": assumptions.degradation_rate.to_string(),
            "price_inflation": assumptions.price_inflation.to_string(),
            "vat": assumptions.vat.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
