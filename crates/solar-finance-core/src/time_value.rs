use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::SolarFinanceError;
use crate::types::{Money, Rate};
use crate::SolarFinanceResult;

const NPV_TOLERANCE: Decimal = dec!(0.000001);
const MAX_IRR_ITERATIONS: u32 = 100;

/// Brackets searched for a sign change, in order.
const IRR_BRACKETS: [(Decimal, Decimal); 3] = [
    (dec!(0), dec!(1)),
    (dec!(1), dec!(10)),
    (dec!(-0.5), dec!(0)),
];

/// Net Present Value of a series of cash flows, index 0 undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> SolarFinanceResult<Money> {
    if rate <= dec!(-1) {
        return Err(SolarFinanceError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            // Past 28 significant digits the remaining terms vanish.
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) => d,
                None => break,
            };
        }
        if discount.is_zero() {
            return Err(SolarFinanceError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return by bisection.
///
/// NPV is monotonically decreasing in the rate for an outflow followed by
/// inflows, so halving a bracket with a sign change always converges. Fails
/// with `ConvergenceFailure` when no bracket shows a sign change or the
/// iteration cap is reached before `|NPV| < 1e-6`.
pub fn irr(cash_flows: &[Money]) -> SolarFinanceResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(SolarFinanceError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR requires at least 2 cash flows".into(),
        });
    }

    let mut bracket = None;
    for (lo, hi) in IRR_BRACKETS {
        let npv_lo = npv(lo, cash_flows)?;
        if npv_lo.abs() < NPV_TOLERANCE {
            return Ok(lo);
        }
        let npv_hi = npv(hi, cash_flows)?;
        if npv_hi.abs() < NPV_TOLERANCE {
            return Ok(hi);
        }
        if npv_lo.is_sign_negative() != npv_hi.is_sign_negative() {
            bracket = Some((lo, hi, npv_lo));
            break;
        }
    }

    let Some((mut lo, mut hi, mut npv_lo)) = bracket else {
        return Err(SolarFinanceError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: 0,
            last_delta: npv(Decimal::ZERO, cash_flows)?,
        });
    };

    let mut last_delta = npv_lo;
    for _ in 0..MAX_IRR_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let npv_mid = npv(mid, cash_flows)?;
        if npv_mid.abs() < NPV_TOLERANCE {
            return Ok(mid);
        }
        if npv_mid.is_sign_negative() == npv_lo.is_sign_negative() {
            lo = mid;
            npv_lo = npv_mid;
        } else {
            hi = mid;
        }
        last_delta = npv_mid;
    }

    Err(SolarFinanceError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta,
    })
}

/// Payment (PMT) per period for a level-payment loan, spreadsheet sign
/// convention: a positive present value yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> SolarFinanceResult<Money> {
    if nper == 0 {
        return Err(SolarFinanceError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powi(nper as i64)
        .ok_or_else(|| SolarFinanceError::InvalidInput {
            field: "nper".into(),
            reason: format!("Compounding over {nper} periods overflows"),
        })?;
    let growth = factor - Decimal::ONE;

    if growth.is_zero() {
        return Err(SolarFinanceError::DivisionByZero {
            context: "PMT compounding factor".into(),
        });
    }

    let compounded = present_value
        .checked_mul(factor)
        .ok_or_else(|| SolarFinanceError::InvalidInput {
            field: "present_value".into(),
            reason: format!("Compounding over {nper} periods overflows"),
        })?;
    Ok(rate / growth * -(compounded + future_value))
}
