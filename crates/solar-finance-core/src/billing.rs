//! Conversion between monthly electricity bills and monthly consumption.
//!
//! Energy to money is plain arithmetic. Money to energy rounds up, so usage
//! is never under-estimated.

use rust_decimal::Decimal;

use crate::error::SolarFinanceError;
use crate::tariff::Tariff;
use crate::types::{Kwh, Money, Rate};
use crate::SolarFinanceResult;

/// VAT-exclusive monthly bill for `kwh` of consumption.
///
/// Tiered tariffs bill each tier for the portion of consumption falling in
/// `[lower, upper)`. Negative consumption bills as zero.
pub fn bill_from_consumption(kwh: Kwh, tariff: &Tariff) -> Money {
    if kwh <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match tariff {
        Tariff::Flat { price_per_kwh, .. } => kwh * price_per_kwh,
        Tariff::Tiered { tiers } => tiers
            .iter()
            .map(|tier| {
                let above_lower = (kwh - tier.lower_kwh).max(Decimal::ZERO);
                let in_tier = match tier.width() {
                    Some(width) => above_lower.min(width),
                    None => above_lower,
                };
                in_tier * tier.price_per_kwh
            })
            .sum(),
    }
}

/// Monthly consumption implied by a VAT-inclusive bill.
///
/// Walks the tiers spending the VAT-exclusive amount; once the remainder fits
/// within a tier the partial tier is rounded up to the next whole kWh.
/// Non-positive bills give zero. The tariff is validated first, and a
/// negative VAT rate is rejected.
pub fn consumption_from_bill(bill_with_vat: Money, tariff: &Tariff, vat: Rate) -> SolarFinanceResult<Kwh> {
    if vat < Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "vat".into(),
            reason: "VAT rate cannot be negative".into(),
        });
    }
    tariff.validate()?;
    if bill_with_vat <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let mut remaining = bill_with_vat / (Decimal::ONE + vat);

    let kwh = match tariff {
        Tariff::Flat { price_per_kwh, .. } => (remaining / price_per_kwh).ceil(),
        Tariff::Tiered { tiers } => {
            let mut consumed = Decimal::ZERO;
            for tier in tiers {
                match tier.width() {
                    Some(width) if remaining > width * tier.price_per_kwh => {
                        consumed += width;
                        remaining -= width * tier.price_per_kwh;
                    }
                    _ => {
                        consumed += (remaining / tier.price_per_kwh).ceil();
                        break;
                    }
                }
            }
            consumed
        }
    };
    Ok(kwh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::{self, CustomerCategory};
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_tier_only() {
        assert_eq!(bill_from_consumption(dec!(40), &tariff::residential()), dec!(75720));
    }

    #[test]
    fn test_tier_boundaries() {
        let t = tariff::residential();
        assert_eq!(bill_from_consumption(dec!(50), &t), dec!(94650));
        assert_eq!(bill_from_consumption(dec!(100), &t), dec!(192450));
        assert_eq!(bill_from_consumption(dec!(400), &t), dec!(1025250));
        // 400 + 100 kWh in the unbounded tier
        assert_eq!(bill_from_consumption(dec!(500), &t), dec!(1355450));
    }

    #[test]
    fn test_fractional_consumption_is_not_rounded() {
        let t = tariff::residential();
        assert_eq!(bill_from_consumption(dec!(0.5), &t), dec!(946.5));
    }

    #[test]
    fn test_negative_consumption_bills_zero() {
        assert_eq!(bill_from_consumption(dec!(-10), &tariff::residential()), Decimal::ZERO);
    }

    #[test]
    fn test_flat_rate_bill() {
        let t = Tariff::for_category(CustomerCategory::CommercialUnder6kV).unwrap();
        assert_eq!(bill_from_consumption(dec!(1000), &t), dec!(3549000));
    }

    #[test]
    fn test_consumption_from_bill_reference_case() {
        let t = tariff::residential();
        let kwh = consumption_from_bill(dec!(1948508), &t, dec!(0.08)).unwrap();
        assert_eq!(kwh, dec!(636));
    }

    #[test]
    fn test_consumption_from_exact_tier_total() {
        // Exactly two full tiers of spend, VAT included
        let t = tariff::residential();
        let kwh = consumption_from_bill(dec!(192450) * dec!(1.08), &t, dec!(0.08)).unwrap();
        assert_eq!(kwh, dec!(100));
    }

    #[test]
    fn test_consumption_from_non_positive_bill() {
        let t = tariff::residential();
        assert_eq!(consumption_from_bill(dec!(0), &t, dec!(0.08)).unwrap(), Decimal::ZERO);
        assert_eq!(consumption_from_bill(dec!(-5000), &t, dec!(0.08)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_flat_consumption_rounds_up() {
        let t = Tariff::for_category(CustomerCategory::CommercialOver22kV).unwrap();
        // 3265 * 100 = 326,500 ex VAT; one extra dong pushes to 101 kWh
        let kwh = consumption_from_bill((dec!(326500) + dec!(1)) * dec!(1.08), &t, dec!(0.08)).unwrap();
        assert_eq!(kwh, dec!(101));
        let kwh = consumption_from_bill(dec!(326500) * dec!(1.08), &t, dec!(0.08)).unwrap();
        assert_eq!(kwh, dec!(100));
    }

    #[test]
    fn test_negative_vat_rejected() {
        let err = consumption_from_bill(dec!(100000), &tariff::residential(), dec!(-1)).unwrap_err();
        assert!(matches!(err, SolarFinanceError::InvalidInput { ref field, .. } if field == "vat"));
        assert!(consumption_from_bill(dec!(100000), &tariff::residential(), dec!(-0.5)).is_err());
        assert!(consumption_from_bill(dec!(100000), &tariff::residential(), dec!(0)).is_ok());
    }

    #[test]
    fn test_zero_flat_rate_rejected() {
        let t = Tariff::Flat {
            category: CustomerCategory::CommercialUnder6kV,
            price_per_kwh: Decimal::ZERO,
        };
        assert!(consumption_from_bill(dec!(100000), &t, dec!(0.08)).is_err());
    }
}
