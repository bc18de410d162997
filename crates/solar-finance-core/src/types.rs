use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SolarFinanceError;
use crate::SolarFinanceResult;

/// All monetary values, in VND. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.04 = 4%).
pub type Rate = Decimal;

/// Percentages as entered by the customer (90 = 90%).
pub type Percent = Decimal;

/// Energy in kilowatt-hours
pub type Kwh = Decimal;

/// Installed peak capacity in kilowatts
pub type Kwp = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

pub const DEFAULT_LIFETIME_YEARS: u32 = 20;
/// Upper bound for projection horizons and loan terms.
pub const MAX_YEARS: u32 = 50;
pub const DEFAULT_DEGRADATION_RATE: Rate = dec!(0.007);
pub const DEFAULT_PRICE_INFLATION: Rate = dec!(0.04);
pub const DEFAULT_VAT: Rate = dec!(0.08);
pub const DEFAULT_MAINTENANCE_PER_KWP: Money = dec!(300000);
/// Standard specific yield used by the production model (kWh/kWp/year).
pub const STANDARD_ANNUAL_YIELD: Decimal = dec!(1380);

/// Modelling constants shared by every calculator.
///
/// Deserialises with defaults for any missing field, so an empty JSON object
/// yields the standard Vietnamese residential assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    /// Panel lifetime, and therefore projection horizon, in years
    pub lifetime_years: u32,
    /// Annual panel output loss (0.007 = 0.7%/year)
    pub degradation_rate: Rate,
    /// Annual electricity price escalation
    pub price_inflation: Rate,
    /// VAT applied to electricity bills and to the investment
    pub vat: Rate,
    /// Operation and maintenance cost per kWp per year
    pub maintenance_per_kwp: Money,
    /// Specific yield used when no location yield is selected
    pub standard_annual_yield: Decimal,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            lifetime_years: DEFAULT_LIFETIME_YEARS,
            degradation_rate: DEFAULT_DEGRADATION_RATE,
            price_inflation: DEFAULT_PRICE_INFLATION,
            vat: DEFAULT_VAT,
            maintenance_per_kwp: DEFAULT_MAINTENANCE_PER_KWP,
            standard_annual_yield: STANDARD_ANNUAL_YIELD,
        }
    }
}

impl Assumptions {
    pub fn validate(&self) -> SolarFinanceResult<()> {
        if self.lifetime_years == 0 || self.lifetime_years > MAX_YEARS {
            return Err(SolarFinanceError::InvalidInput {
                field: "lifetime_years".into(),
                reason: format!("Lifetime must be between 1 and {MAX_YEARS} years"),
            });
        }
        if self.degradation_rate < Decimal::ZERO || self.degradation_rate >= Decimal::ONE {
            return Err(SolarFinanceError::InvalidInput {
                field: "degradation_rate".into(),
                reason: "Degradation rate must be in [0, 1)".into(),
            });
        }
        if self.price_inflation <= dec!(-1) {
            return Err(SolarFinanceError::InvalidInput {
                field: "price_inflation".into(),
                reason: "Price inflation must be greater than -100%".into(),
            });
        }
        if self.vat < Decimal::ZERO {
            return Err(SolarFinanceError::InvalidInput {
                field: "vat".into(),
                reason: "VAT cannot be negative".into(),
            });
        }
        if self.maintenance_per_kwp < Decimal::ZERO {
            return Err(SolarFinanceError::InvalidInput {
                field: "maintenance_per_kwp".into(),
                reason: "Maintenance cost cannot be negative".into(),
            });
        }
        if self.standard_annual_yield <= Decimal::ZERO {
            return Err(SolarFinanceError::InvalidInput {
                field: "standard_annual_yield".into(),
                reason: "Standard yield must be positive".into(),
            });
        }
        Ok(())
    }

    /// `1 + VAT`
    pub fn vat_factor(&self) -> Decimal {
        Decimal::ONE + self.vat
    }
}

fn default_efficiency() -> Percent {
    dec!(100)
}

/// The physical installation being evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSpec {
    pub capacity_kwp: Kwp,
    /// Installed cost per kWp before VAT
    pub cost_per_kwp: Money,
    #[serde(default = "default_efficiency")]
    pub efficiency_pct: Percent,
    /// Specific yield in kWh/kWp/year; the standard yield when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_yield_per_kwp: Option<Decimal>,
    #[serde(default)]
    pub install_year: u32,
}

impl SystemSpec {
    /// Investment cost including VAT, rounded to whole VND.
    pub fn total_investment(&self, assumptions: &Assumptions) -> Money {
        round_vnd(self.capacity_kwp * self.cost_per_kwp * assumptions.vat_factor())
    }

    pub fn annual_maintenance(&self, assumptions: &Assumptions) -> Money {
        self.capacity_kwp * assumptions.maintenance_per_kwp
    }

    pub fn effective_yield(&self, assumptions: &Assumptions) -> Decimal {
        self.annual_yield_per_kwp
            .unwrap_or(assumptions.standard_annual_yield)
    }
}

/// Round to whole VND, halves away from zero.
pub fn round_vnd(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate a customer-facing percentage lies in [0, 100].
pub(crate) fn check_percent(field: &str, value: Percent) -> SolarFinanceResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(SolarFinanceError::InvalidInput {
            field: field.into(),
            reason: "Percentage must be between 0 and 100".into(),
        });
    }
    Ok(())
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata. `assumptions` is
/// recorded as given.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: serde_json::Value,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions,
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assumptions_from_empty_json() {
        let a: Assumptions = serde_json::from_str("{}").unwrap();
        assert_eq!(a, Assumptions::default());
        assert_eq!(a.lifetime_years, 20);
        assert_eq!(a.vat_factor(), dec!(1.08));
    }

    #[test]
    fn test_assumptions_reject_zero_lifetime() {
        let a = Assumptions {
            lifetime_years: 0,
            ..Assumptions::default()
        };
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_total_investment_includes_vat() {
        let spec = SystemSpec {
            capacity_kwp: dec!(5),
            cost_per_kwp: dec!(10000000),
            efficiency_pct: dec!(100),
            annual_yield_per_kwp: None,
            install_year: 0,
        };
        let a = Assumptions::default();
        assert_eq!(spec.total_investment(&a), dec!(54000000));
        assert_eq!(spec.annual_maintenance(&a), dec!(1500000));
        assert_eq!(spec.effective_yield(&a), dec!(1380));
    }

    #[test]
    fn test_envelope_records_assumptions_as_given() {
        let out = with_metadata("m", serde_json::json!({ "vat": "0.08" }), vec![], 7, dec!(1));
        assert_eq!(out.assumptions["vat"], serde_json::json!("0.08"));
        assert_eq!(out.metadata.computation_time_us, 7);
    }

    #[test]
    fn test_assumptions_reject_lifetime_over_cap() {
        let a = Assumptions {
            lifetime_years: MAX_YEARS + 1,
            ..Assumptions::default()
        };
        assert!(a.validate().is_err());
    }
}
