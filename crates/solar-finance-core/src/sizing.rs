use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::SolarFinanceError;
use crate::types::{check_percent, Kwh, Kwp, Percent};
use crate::SolarFinanceResult;

/// Recommended system capacity, rounded to 0.1 kWp.
///
/// Sized to the daytime share of yearly consumption only (surplus is neither
/// stored nor credited), then scaled down by the safety ratio to hedge an
/// optimistic location yield.
pub fn recommended_capacity(
    monthly_consumption_kwh: Kwh,
    daytime_usage_pct: Percent,
    province_annual_yield_per_kwp: Decimal,
    safety_ratio_pct: Percent,
) -> SolarFinanceResult<Kwp> {
    check_percent("daytime_usage_pct", daytime_usage_pct)?;
    check_percent("safety_ratio_pct", safety_ratio_pct)?;
    if province_annual_yield_per_kwp <= Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "province_annual_yield_per_kwp".into(),
            reason: "Location yield must be positive".into(),
        });
    }
    if monthly_consumption_kwh <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let yearly = monthly_consumption_kwh * dec!(12);
    let daytime_yearly = yearly * daytime_usage_pct / dec!(100);
    let capacity = daytime_yearly / province_annual_yield_per_kwp * safety_ratio_pct / dec!(100);

    Ok(capacity.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}
