use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::billing::{bill_from_consumption, consumption_from_bill};
use crate::error::SolarFinanceError;
use crate::evaluation::{evaluate, EvaluationInput, InvestmentMetrics, ReturnBasis};
use crate::financing::FinancingTerms;
use crate::savings::{project_savings, SavingsInput, SavingsProjection};
use crate::sizing::recommended_capacity;
use crate::tariff::{find_province, CustomerCategory, Tariff};
use crate::types::*;
use crate::SolarFinanceResult;

/// Bills below this (VAT inclusive) rarely justify an installation.
pub const LOW_BILL_THRESHOLD: Money = dec!(1000000);

/// Installed cost per kWp before VAT when none is quoted.
pub const DEFAULT_COST_PER_KWP: Money = dec!(10000000);

/// Specific yield used to estimate production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldSource {
    /// `Assumptions::standard_annual_yield` everywhere
    #[default]
    Standard,
    /// The province's own yield
    Province,
}

fn default_daytime_usage() -> Percent {
    dec!(90)
}

fn default_safety_ratio() -> Percent {
    dec!(90)
}

fn default_efficiency() -> Percent {
    dec!(100)
}

fn default_cost_per_kwp() -> Money {
    DEFAULT_COST_PER_KWP
}

/// Everything a customer enters on the analysis form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarAnalysisInput {
    /// Province name or URL slug
    pub province: String,
    #[serde(default)]
    pub category: CustomerCategory,
    /// Current monthly bill including VAT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_bill_with_vat: Option<Money>,
    /// Used when no bill is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_consumption_kwh: Option<Kwh>,
    #[serde(default = "default_daytime_usage")]
    pub daytime_usage_pct: Percent,
    #[serde(default = "default_safety_ratio")]
    pub safety_ratio_pct: Percent,
    #[serde(default = "default_efficiency")]
    pub efficiency_pct: Percent,
    #[serde(default = "default_cost_per_kwp")]
    pub cost_per_kwp: Money,
    /// Install this capacity instead of the recommendation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_kwp: Option<Kwp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financing: Option<FinancingTerms>,
    #[serde(default)]
    pub return_basis: ReturnBasis,
    #[serde(default)]
    pub production_yield: YieldSource,
    #[serde(default)]
    pub assumptions: Assumptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarAnalysis {
    pub province: String,
    pub province_annual_yield_per_kwp: Decimal,
    pub sun_hours_per_day: Decimal,
    pub category: CustomerCategory,
    pub monthly_consumption_kwh: Kwh,
    pub monthly_bill_with_vat: Money,
    pub recommended_capacity_kwp: Kwp,
    /// Capacity actually evaluated
    pub capacity_kwp: Kwp,
    pub total_investment: Money,
    pub savings: SavingsProjection,
    pub metrics: InvestmentMetrics,
}

/// Run the full calculator chain for one customer: bill to consumption,
/// sizing, lifetime savings and investment returns.
pub fn analyze(input: &SolarAnalysisInput) -> SolarFinanceResult<ComputationOutput<SolarAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let assumptions = &input.assumptions;
    assumptions.validate()?;

    let profile = find_province(&input.province)?;
    let tariff = Tariff::for_category(input.category)?;

    let (monthly_kwh, monthly_bill) = match (input.monthly_bill_with_vat, input.monthly_consumption_kwh) {
        (Some(bill), _) => {
            if bill < Decimal::ZERO {
                return Err(SolarFinanceError::InvalidInput {
                    field: "monthly_bill_with_vat".into(),
                    reason: "Bill cannot be negative".into(),
                });
            }
            (consumption_from_bill(bill, &tariff, assumptions.vat)?, bill)
        }
        (None, Some(kwh)) => {
            if kwh < Decimal::ZERO {
                return Err(SolarFinanceError::InvalidInput {
                    field: "monthly_consumption_kwh".into(),
                    reason: "Consumption cannot be negative".into(),
                });
            }
            (kwh, round_vnd(bill_from_consumption(kwh, &tariff) * assumptions.vat_factor()))
        }
        (None, None) => {
            return Err(SolarFinanceError::InvalidInput {
                field: "monthly_bill_with_vat".into(),
                reason: "Either a monthly bill or monthly consumption is required".into(),
            });
        }
    };

    if monthly_bill < LOW_BILL_THRESHOLD {
        warnings.push(format!(
            "Monthly bill below {LOW_BILL_THRESHOLD} VND; savings are unlikely to justify an installation"
        ));
    }

    let recommended = recommended_capacity(
        monthly_kwh,
        input.daytime_usage_pct,
        profile.annual_yield_per_kwp,
        input.safety_ratio_pct,
    )?;
    let capacity = input.capacity_kwp.unwrap_or(recommended);
    if capacity <= Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "capacity_kwp".into(),
            reason: "Consumption is too low to size a system".into(),
        });
    }

    let system = SystemSpec {
        capacity_kwp: capacity,
        cost_per_kwp: input.cost_per_kwp,
        efficiency_pct: input.efficiency_pct,
        annual_yield_per_kwp: match input.production_yield {
            YieldSource::Standard => None,
            YieldSource::Province => Some(profile.annual_yield_per_kwp),
        },
        install_year: 0,
    };
    let total_investment = system.total_investment(assumptions);

    tracing::debug!(
        province = profile.name,
        monthly_kwh = %monthly_kwh,
        recommended_kwp = %recommended,
        capacity_kwp = %capacity,
        "running solar analysis"
    );

    let savings = project_savings(&SavingsInput {
        system,
        daytime_usage_pct: input.daytime_usage_pct,
        baseline_monthly_kwh: monthly_kwh,
        monthly_bill_with_vat: Some(monthly_bill),
        tariff,
        assumptions: assumptions.clone(),
    })?;
    warnings.extend(savings.warnings);

    let metrics = evaluate(&EvaluationInput {
        projections: savings.result.years.clone(),
        total_investment,
        financing: input.financing.clone(),
        return_basis: input.return_basis,
    })?;
    warnings.extend(metrics.warnings);

    let output = SolarAnalysis {
        province: profile.name.to_string(),
        province_annual_yield_per_kwp: profile.annual_yield_per_kwp,
        sun_hours_per_day: profile.sun_hours_per_day,
        category: input.category,
        monthly_consumption_kwh: monthly_kwh,
        monthly_bill_with_vat: monthly_bill,
        recommended_capacity_kwp: recommended,
        capacity_kwp: capacity,
        total_investment,
        savings: savings.result,
        metrics: metrics.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Solar Analysis: bill inversion, sizing, savings projection, investment evaluation",
        serde_json::json!({
            "province": profile.name,
            "category": input.category,
            "daytime_usage_pct": input.daytime_usage_pct.to_string(),
            "safety_ratio_pct": input.safety_ratio_pct.to_string(),
            "cost_per_kwp": input.cost_per_kwp.to_string(),
            "production_yield": input.production_yield,
            "return_basis": input.return_basis,
            "assumptions": assumptions,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: serde_json::Value) -> SolarAnalysisInput {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let i = input(serde_json::json!({ "province": "Hà Nội", "monthly_bill_with_vat": "2000000" }));
        assert_eq!(i.category, CustomerCategory::Residential);
        assert_eq!(i.daytime_usage_pct, dec!(90));
        assert_eq!(i.safety_ratio_pct, dec!(90));
        assert_eq!(i.cost_per_kwp, dec!(10000000));
        assert_eq!(i.production_yield, YieldSource::Standard);
        assert_eq!(i.return_basis, ReturnBasis::UpfrontPayment);
    }

    #[test]
    fn test_bill_is_converted_to_consumption() {
        let i = input(serde_json::json!({ "province": "Hà Nội", "monthly_bill_with_vat": "1948508" }));
        let result = analyze(&i).unwrap();
        assert_eq!(result.result.monthly_consumption_kwh, dec!(636));
        // 636 * 12 * 0.9 / 1031 * 0.9 = 5.99 -> 6.0
        assert_eq!(result.result.recommended_capacity_kwp, dec!(6.0));
        assert_eq!(result.result.capacity_kwp, dec!(6.0));
        assert_eq!(result.result.total_investment, dec!(64800000));
    }

    #[test]
    fn test_capacity_override() {
        let i = input(serde_json::json!({
            "province": "ha-noi",
            "monthly_bill_with_vat": "1948508",
            "capacity_kwp": "4.78"
        }));
        let result = analyze(&i).unwrap();
        assert_eq!(result.result.capacity_kwp, dec!(4.78));
        assert_eq!(result.result.total_investment, dec!(51624000));
        assert_eq!(result.result.savings.years.len(), 20);
    }

    #[test]
    fn test_consumption_without_bill() {
        let i = input(serde_json::json!({ "province": "Hà Nội", "monthly_consumption_kwh": "636" }));
        let result = analyze(&i).unwrap();
        // (94650 + 97800 + 227100 + 286000 + 319700 + 236*3302) * 1.08
        assert_eq!(result.result.monthly_bill_with_vat, dec!(1948884));
    }

    #[test]
    fn test_low_bill_warns() {
        let i = input(serde_json::json!({ "province": "Hà Nội", "monthly_bill_with_vat": "800000" }));
        let result = analyze(&i).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("below")));
    }

    #[test]
    fn test_requires_bill_or_consumption() {
        let i = input(serde_json::json!({ "province": "Hà Nội" }));
        assert!(analyze(&i).is_err());
    }

    #[test]
    fn test_unknown_province() {
        let i = input(serde_json::json!({ "province": "Atlantis", "monthly_bill_with_vat": "2000000" }));
        assert!(matches!(analyze(&i).unwrap_err(), SolarFinanceError::NotFound { .. }));
    }

    #[test]
    fn test_commercial_category_uses_flat_rate() {
        let i = input(serde_json::json!({
            "province": "Hà Nội",
            "category": "kinh-doanh-duoi-6kv",
            "monthly_consumption_kwh": "1000"
        }));
        let result = analyze(&i).unwrap();
        assert_eq!(result.result.monthly_bill_with_vat, dec!(3832920));
    }

    #[test]
    fn test_financed_analysis_reports_loan() {
        let i = input(serde_json::json!({
            "province": "Hà Nội",
            "monthly_bill_with_vat": "1948508",
            "capacity_kwp": "4.78",
            "financing": { "installment_share_pct": "90", "term_years": 3 }
        }));
        let result = analyze(&i).unwrap();
        let m = &result.result.metrics;
        assert_eq!(m.financed_amount, dec!(46461600));
        assert_eq!(m.upfront_payment, dec!(5162400));
        assert!(m.monthly_loan_payment > Decimal::ZERO);
        assert!(m.payback_years.map_or(true, |p| p >= dec!(3)));
    }

    #[test]
    fn test_province_yield_source_raises_output_in_sunny_south() {
        let standard = input(serde_json::json!({
            "province": "Ninh Thuận",
            "monthly_bill_with_vat": "3000000",
            "capacity_kwp": "5"
        }));
        let mut local = standard.clone();
        local.production_yield = YieldSource::Province;
        let a = analyze(&standard).unwrap();
        let b = analyze(&local).unwrap();
        let profile = find_province("Ninh Thuận").unwrap();
        let expected_ratio = profile.annual_yield_per_kwp / STANDARD_ANNUAL_YIELD;
        let ratio = b.result.savings.years[0].production_kwh / a.result.savings.years[0].production_kwh;
        assert!((ratio - expected_ratio).abs() < dec!(0.0000001));
    }
}
