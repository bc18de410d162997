use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::SolarFinanceError;
use crate::types::{Kwh, Kwp, Percent, Rate, Years};
use crate::SolarFinanceResult;

/// Expected monthly output of a system.
///
/// `annual_yield × capacity × efficiency / 12`, derated by
/// `(1 - degradation)^year_offset` once the system has aged. Fractional
/// offsets (1/12 per month) give a smooth decline rather than annual steps.
pub fn monthly_production(
    capacity_kwp: Kwp,
    annual_yield_per_kwp: Decimal,
    efficiency_pct: Percent,
    year_offset: Years,
    degradation_rate: Rate,
) -> SolarFinanceResult<Kwh> {
    if capacity_kwp <= Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "capacity_kwp".into(),
            reason: "System capacity must be positive".into(),
        });
    }
    if efficiency_pct <= Decimal::ZERO || efficiency_pct > dec!(100) {
        return Err(SolarFinanceError::InvalidInput {
            field: "efficiency_pct".into(),
            reason: "Efficiency must be in (0, 100]".into(),
        });
    }
    if annual_yield_per_kwp <= Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "annual_yield_per_kwp".into(),
            reason: "Specific yield must be positive".into(),
        });
    }
    if degradation_rate < Decimal::ZERO || degradation_rate >= Decimal::ONE {
        return Err(SolarFinanceError::InvalidInput {
            field: "degradation_rate".into(),
            reason: "Degradation rate must be in [0, 1)".into(),
        });
    }
    if year_offset < Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "year_offset".into(),
            reason: "Year offset cannot be negative".into(),
        });
    }

    let annual = annual_yield_per_kwp * capacity_kwp * efficiency_pct / dec!(100);
    let monthly = annual / dec!(12);

    if year_offset > Decimal::ZERO && !degradation_rate.is_zero() {
        let retained = Decimal::ONE - degradation_rate;
        Ok(monthly * retained.powd(year_offset))
    } else {
        Ok(monthly)
    }
}

/// Share of production consumed on site while the household is drawing power
/// in daylight hours. No storage, so the rest is not credited.
pub fn consumed_fraction(produced_kwh: Kwh, daytime_usage_pct: Percent) -> Kwh {
    let pct = daytime_usage_pct.clamp(Decimal::ZERO, dec!(100));
    produced_kwh * pct / dec!(100)
}
