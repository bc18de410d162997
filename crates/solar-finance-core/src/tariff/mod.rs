//! Static tariff tables: residential tiers, commercial flat rates, province
//! solar resource and installment loan rates.

pub mod provinces;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SolarFinanceError;
use crate::types::{Kwh, Money, Percent};
use crate::SolarFinanceResult;

pub use provinces::{find_province, ProvinceSolarProfile, PROVINCES};

/// One block of a progressive tariff. Covers consumption in
/// `[lower_kwh, upper_kwh)`; `upper_kwh = None` is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffTier {
    pub lower_kwh: Kwh,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_kwh: Option<Kwh>,
    /// VAT-exclusive price, VND/kWh
    pub price_per_kwh: Money,
}

impl TariffTier {
    /// kWh billable in this tier; `None` when unbounded.
    pub fn width(&self) -> Option<Kwh> {
        self.upper_kwh.map(|upper| upper - self.lower_kwh)
    }
}

/// Customer category, deciding between tiered and flat pricing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerCategory {
    #[default]
    #[serde(rename = "residential", alias = "sinh-hoat")]
    Residential,
    #[serde(rename = "commercial_under_6kv", alias = "kinh-doanh-duoi-6kv")]
    CommercialUnder6kV,
    #[serde(rename = "commercial_6kv_to_22kv", alias = "kinh-doanh-6kv-22kv")]
    Commercial6kVTo22kV,
    #[serde(rename = "commercial_over_22kv", alias = "kinh-doanh-tren-22kv")]
    CommercialOver22kV,
}

impl CustomerCategory {
    pub const ALL: [CustomerCategory; 4] = [
        CustomerCategory::Residential,
        CustomerCategory::CommercialUnder6kV,
        CustomerCategory::Commercial6kVTo22kV,
        CustomerCategory::CommercialOver22kV,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CustomerCategory::Residential => "residential",
            CustomerCategory::CommercialUnder6kV => "commercial_under_6kv",
            CustomerCategory::Commercial6kVTo22kV => "commercial_6kv_to_22kv",
            CustomerCategory::CommercialOver22kV => "commercial_over_22kv",
        }
    }

    /// Slug used by the website forms and URLs.
    pub fn slug(self) -> &'static str {
        match self {
            CustomerCategory::Residential => "sinh-hoat",
            CustomerCategory::CommercialUnder6kV => "kinh-doanh-duoi-6kv",
            CustomerCategory::Commercial6kVTo22kV => "kinh-doanh-6kv-22kv",
            CustomerCategory::CommercialOver22kV => "kinh-doanh-tren-22kv",
        }
    }

    pub fn is_commercial(self) -> bool {
        self != CustomerCategory::Residential
    }
}

impl fmt::Display for CustomerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CustomerCategory {
    type Err = SolarFinanceError;

    /// Accepts either the canonical name or the website slug; dashes and
    /// underscores are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        CustomerCategory::ALL
            .into_iter()
            .find(|c| c.slug() == wanted || c.name().replace('_', "-") == wanted)
            .ok_or_else(|| SolarFinanceError::NotFound {
                kind: "customer category".into(),
                key: s.to_string(),
            })
    }
}

/// A tariff schedule: progressive tiers or a single flat rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tariff {
    Tiered { tiers: Vec<TariffTier> },
    Flat {
        category: CustomerCategory,
        price_per_kwh: Money,
    },
}

impl Tariff {
    /// Build a tiered tariff, checking the tiers start at zero, are
    /// contiguous, and end with an unbounded tier.
    pub fn tiered(tiers: Vec<TariffTier>) -> SolarFinanceResult<Self> {
        let tariff = Tariff::Tiered { tiers };
        tariff.validate()?;
        Ok(tariff)
    }

    pub fn validate(&self) -> SolarFinanceResult<()> {
        match self {
            Tariff::Tiered { tiers } => validate_tiers(tiers),
            Tariff::Flat { price_per_kwh, .. } => {
                if *price_per_kwh <= Decimal::ZERO {
                    return Err(SolarFinanceError::InvalidInput {
                        field: "price_per_kwh".into(),
                        reason: "Flat rate must be positive".into(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Standard tariff for a customer category.
    pub fn for_category(category: CustomerCategory) -> SolarFinanceResult<Self> {
        match category {
            CustomerCategory::Residential => Ok(residential()),
            other => Ok(Tariff::Flat {
                category: other,
                price_per_kwh: commercial_rate(other)?,
            }),
        }
    }
}

fn validate_tiers(tiers: &[TariffTier]) -> SolarFinanceResult<()> {
    let invalid = |reason: &str| SolarFinanceError::InvalidInput {
        field: "tiers".into(),
        reason: reason.into(),
    };

    let first = tiers.first().ok_or_else(|| invalid("At least one tier is required"))?;
    if !first.lower_kwh.is_zero() {
        return Err(invalid("First tier must start at 0 kWh"));
    }

    for (i, tier) in tiers.iter().enumerate() {
        if tier.price_per_kwh <= Decimal::ZERO {
            return Err(invalid(&format!("Tier {i} price must be positive")));
        }
        let is_last = i + 1 == tiers.len();
        match (tier.upper_kwh, is_last) {
            (None, true) => {}
            (None, false) => return Err(invalid(&format!("Only the last tier may be unbounded (tier {i})"))),
            (Some(_), true) => return Err(invalid("Last tier must be unbounded")),
            (Some(upper), false) => {
                if upper <= tier.lower_kwh {
                    return Err(invalid(&format!("Tier {i} upper bound must exceed its lower bound")));
                }
                if tiers[i + 1].lower_kwh != upper {
                    return Err(invalid(&format!("Tier {} must start where tier {i} ends", i + 1)));
                }
            }
        }
    }
    Ok(())
}

const fn tier(lower_kwh: Kwh, upper_kwh: Option<Kwh>, price_per_kwh: Money) -> TariffTier {
    TariffTier {
        lower_kwh,
        upper_kwh,
        price_per_kwh,
    }
}

/// Residential progressive tariff, VAT-exclusive VND/kWh.
pub const RESIDENTIAL_TIERS: [TariffTier; 6] = [
    tier(dec!(0), Some(dec!(50)), dec!(1893)),
    tier(dec!(50), Some(dec!(100)), dec!(1956)),
    tier(dec!(100), Some(dec!(200)), dec!(2271)),
    tier(dec!(200), Some(dec!(300)), dec!(2860)),
    tier(dec!(300), Some(dec!(400)), dec!(3197)),
    tier(dec!(400), None, dec!(3302)),
];

pub fn residential() -> Tariff {
    Tariff::Tiered {
        tiers: RESIDENTIAL_TIERS.to_vec(),
    }
}

/// Flat commercial rate for a category, VAT-exclusive VND/kWh.
pub fn commercial_rate(category: CustomerCategory) -> SolarFinanceResult<Money> {
    match category {
        CustomerCategory::CommercialUnder6kV => Ok(dec!(3549)),
        CustomerCategory::Commercial6kVTo22kV => Ok(dec!(3465)),
        CustomerCategory::CommercialOver22kV => Ok(dec!(3265)),
        CustomerCategory::Residential => Err(SolarFinanceError::NotFound {
            kind: "flat rate".into(),
            key: category.slug().into(),
        }),
    }
}

/// Annual interest rate (percent) offered for an installment term.
pub fn loan_rate_for_term(term_years: u32) -> SolarFinanceResult<Percent> {
    match term_years {
        1..=7 => Ok(dec!(12)),
        _ => Err(SolarFinanceError::NotFound {
            kind: "installment loan rate".into(),
            key: format!("{term_years} years"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residential_tiers_are_contiguous() {
        assert!(residential().validate().is_ok());
        assert_eq!(RESIDENTIAL_TIERS[2].width(), Some(dec!(100)));
        assert_eq!(RESIDENTIAL_TIERS[5].width(), None);
    }

    #[test]
    fn test_gap_between_tiers_rejected() {
        let tiers = vec![
            tier(dec!(0), Some(dec!(50)), dec!(1000)),
            tier(dec!(51), None, dec!(2000)),
        ];
        assert!(Tariff::tiered(tiers).is_err());
    }

    #[test]
    fn test_bounded_last_tier_rejected() {
        let tiers = vec![tier(dec!(0), Some(dec!(50)), dec!(1000))];
        assert!(Tariff::tiered(tiers).is_err());
    }

    #[test]
    fn test_commercial_rates() {
        assert_eq!(commercial_rate(CustomerCategory::CommercialUnder6kV).unwrap(), dec!(3549));
        assert_eq!(commercial_rate(CustomerCategory::CommercialOver22kV).unwrap(), dec!(3265));
        assert!(commercial_rate(CustomerCategory::Residential).is_err());
    }

    #[test]
    fn test_category_from_slug() {
        let c: CustomerCategory = "kinh-doanh-6kv-22kv".parse().unwrap();
        assert_eq!(c, CustomerCategory::Commercial6kVTo22kV);
        let c: CustomerCategory = "commercial_over_22kv".parse().unwrap();
        assert_eq!(c, CustomerCategory::CommercialOver22kV);
        let c: CustomerCategory = "residential".parse().unwrap();
        assert_eq!(c, CustomerCategory::Residential);
        assert!("industrial".parse::<CustomerCategory>().is_err());
    }

    #[test]
    fn test_category_serde_accepts_slug_alias() {
        let c: CustomerCategory = serde_json::from_str("\"kinh-doanh-duoi-6kv\"").unwrap();
        assert_eq!(c, CustomerCategory::CommercialUnder6kV);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"commercial_under_6kv\"");
    }

    #[test]
    fn test_loan_rate_table() {
        assert_eq!(loan_rate_for_term(3).unwrap(), dec!(12));
        assert!(loan_rate_for_term(0).is_err());
        assert!(loan_rate_for_term(8).is_err());
    }
}
