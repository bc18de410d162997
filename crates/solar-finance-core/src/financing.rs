use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SolarFinanceError;
use crate::tariff::loan_rate_for_term;
use crate::time_value::pmt;
use crate::types::*;
use crate::SolarFinanceResult;

/// How much of the investment is paid in installments, and on what terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingTerms {
    /// Share of the total investment financed (90 = 90%)
    pub installment_share_pct: Percent,
    pub term_years: u32,
    /// Annual rate in percent; the standard rate for the term when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_interest_rate_pct: Option<Percent>,
}

/// Investment divided between cash paid now and the financed balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSplit {
    pub total_investment: Money,
    pub financed_amount: Money,
    pub upfront_payment: Money,
}

impl FinancingTerms {
    pub fn interest_rate_pct(&self) -> SolarFinanceResult<Percent> {
        match self.annual_interest_rate_pct {
            Some(rate) => Ok(rate),
            None => loan_rate_for_term(self.term_years),
        }
    }

    /// Financed amount in whole VND (rounded down); the customer pays the rest up front.
    pub fn split(&self, total_investment: Money) -> SolarFinanceResult<InvestmentSplit> {
        check_percent("installment_share_pct", self.installment_share_pct)?;
        if total_investment < Decimal::ZERO {
            return Err(SolarFinanceError::InvalidInput {
                field: "total_investment".into(),
                reason: "Investment cannot be negative".into(),
            });
        }
        let financed_amount = (total_investment * self.installment_share_pct / dec!(100)).floor();
        Ok(InvestmentSplit {
            total_investment,
            financed_amount,
            upfront_payment: total_investment - financed_amount,
        })
    }
}

/// A single month of the loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPeriod {
    /// 1-based payment number
    pub month: u32,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

/// Twelve months of the loan rolled up. `year` is 0-based to line up with
/// the savings projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanYear {
    pub year: u32,
    pub payments: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_interest_rate_pct: Percent,
    pub term_months: u32,
    /// Level monthly payment, rounded up to whole VND
    pub monthly_payment: Money,
    pub periods: Vec<LoanPeriod>,
    pub years: Vec<LoanYear>,
    pub total_paid: Money,
    pub total_interest: Money,
}

impl AmortizationSchedule {
    /// Payments falling in a 0-based projection year.
    pub fn payments_in_year(&self, year: u32) -> Money {
        self.years
            .iter()
            .find(|y| y.year == year)
            .map(|y| y.payments)
            .unwrap_or_default()
    }

    /// Balance still owed at the end of a 0-based projection year.
    pub fn balance_after_year(&self, year: u32) -> Money {
        self.years
            .iter()
            .take_while(|y| y.year <= year)
            .last()
            .map(|y| y.closing_balance)
            .unwrap_or(self.principal)
    }
}

/// Build a level-payment amortization schedule for `principal`.
///
/// The payment is fixed for the term; interest accrues monthly on the
/// declining balance and is rounded to whole VND, and the final payment
/// settles whatever rounding leaves outstanding.
pub fn amortize(
    terms: &FinancingTerms,
    principal: Money,
) -> SolarFinanceResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if principal < Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "principal".into(),
            reason: "Loan principal cannot be negative".into(),
        });
    }
    let rate_pct = terms.interest_rate_pct()?;
    if rate_pct < Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "annual_interest_rate_pct".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if terms.term_years == 0 && !principal.is_zero() {
        return Err(SolarFinanceError::InvalidInput {
            field: "term_years".into(),
            reason: "A financed balance needs a term of at least 1 year".into(),
        });
    }
    if terms.term_years > MAX_YEARS {
        return Err(SolarFinanceError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Loan term cannot exceed {MAX_YEARS} years"),
        });
    }
    if rate_pct > dec!(100) {
        return Err(SolarFinanceError::InvalidInput {
            field: "annual_interest_rate_pct".into(),
            reason: "Interest rate cannot exceed 100% a year".into(),
        });
    }

    let term_months = terms.term_years * 12;
    let monthly_rate = rate_pct / dec!(100) / dec!(12);

    let monthly_payment = if principal.is_zero() {
        warnings.push("Nothing financed; schedule is empty".into());
        Decimal::ZERO
    } else {
        (-pmt(monthly_rate, term_months, principal, Decimal::ZERO)?).ceil()
    };

    let mut periods = Vec::with_capacity(term_months as usize);
    let mut balance = principal;
    if !principal.is_zero() {
        for month in 1..=term_months {
            let opening = balance;
            let interest = round_vnd(opening * monthly_rate);
            let mut principal_part = monthly_payment - interest;
            if month == term_months || principal_part >= opening {
                principal_part = opening;
            }
            balance -= principal_part;

            periods.push(LoanPeriod {
                month,
                opening_balance: opening,
                payment: interest + principal_part,
                interest,
                principal: principal_part,
                closing_balance: balance,
            });

            if balance.is_zero() {
                break;
            }
        }
    }

    let years: Vec<LoanYear> = periods
        .chunks(12)
        .enumerate()
        .map(|(i, chunk)| LoanYear {
            year: i as u32,
            payments: chunk.iter().map(|p| p.payment).sum(),
            interest: chunk.iter().map(|p| p.interest).sum(),
            principal: chunk.iter().map(|p| p.principal).sum(),
            closing_balance: chunk.last().map(|p| p.closing_balance).unwrap_or_default(),
        })
        .collect();

    let total_paid: Money = periods.iter().map(|p| p.payment).sum();
    let total_interest = total_paid - principal;

    tracing::debug!(
        principal = %principal,
        monthly_payment = %monthly_payment,
        term_months,
        "amortized installment loan"
    );

    let output = AmortizationSchedule {
        principal,
        annual_interest_rate_pct: rate_pct,
        term_months,
        monthly_payment,
        periods,
        years,
        total_paid,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-Payment Amortization (PMT, monthly compounding)",
        serde_json::json!({
            "principal": principal.to_string(),
            "annual_interest_rate_pct": rate_pct.to_string(),
            "term_years": terms.term_years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(share: Decimal, years: u32, rate: Option<Decimal>) -> FinancingTerms {
        FinancingTerms {
            installment_share_pct: share,
            term_years: years,
            annual_interest_rate_pct: rate,
        }
    }

    #[test]
    fn test_split_rounds_financed_down() {
        let split = terms(dec!(90), 3, None).split(dec!(51624001)).unwrap();
        assert_eq!(split.financed_amount, dec!(46461600));
        assert_eq!(split.upfront_payment, dec!(5162401));
        assert_eq!(split.financed_amount + split.upfront_payment, split.total_investment);
    }

    #[test]
    fn test_split_rejects_share_over_100() {
        assert!(terms(dec!(120), 3, None).split(dec!(1000)).is_err());
    }

    #[test]
    fn test_rate_defaults_from_term_table() {
        assert_eq!(terms(dec!(90), 3, None).interest_rate_pct().unwrap(), dec!(12));
        assert_eq!(terms(dec!(90), 3, Some(dec!(9.5))).interest_rate_pct().unwrap(), dec!(9.5));
        assert!(terms(dec!(90), 10, None).interest_rate_pct().is_err());
    }

    #[test]
    fn test_zero_rate_schedule() {
        let result = amortize(&terms(dec!(100), 1, Some(dec!(0))), dec!(1200)).unwrap();
        let s = &result.result;
        assert_eq!(s.monthly_payment, dec!(100));
        assert_eq!(s.periods.len(), 12);
        assert!(s.periods.iter().all(|p| p.interest.is_zero() && p.payment == dec!(100)));
        assert_eq!(s.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_pays_off_exactly() {
        let result = amortize(&terms(dec!(90), 3, None), dec!(100000000)).unwrap();
        let s = &result.result;
        assert_eq!(s.monthly_payment, dec!(3321431));
        assert_eq!(s.periods.len(), 36);
        assert_eq!(s.periods.last().unwrap().closing_balance, Decimal::ZERO);
        let principal_paid: Decimal = s.periods.iter().map(|p| p.principal).sum();
        assert_eq!(principal_paid, dec!(100000000));
    }

    #[test]
    fn test_balance_declines_and_interest_falls() {
        let result = amortize(&terms(dec!(90), 3, None), dec!(100000000)).unwrap();
        let periods = &result.result.periods;
        assert_eq!(periods[0].interest, dec!(1000000));
        for pair in periods.windows(2) {
            assert!(pair[1].closing_balance < pair[0].closing_balance);
            assert!(pair[1].interest <= pair[0].interest);
        }
    }

    #[test]
    fn test_total_interest_matches_level_payment_formula() {
        let result = amortize(&terms(dec!(90), 3, None), dec!(100000000)).unwrap();
        let s = &result.result;
        let formula = s.monthly_payment * dec!(36) - dec!(100000000);
        // Rounding to whole VND each month moves the total by at most a few dong
        assert!((s.total_interest - formula).abs() < dec!(50));
    }

    #[test]
    fn test_yearly_rollup() {
        let result = amortize(&terms(dec!(90), 3, None), dec!(100000000)).unwrap();
        let s = &result.result;
        assert_eq!(s.years.len(), 3);
        assert_eq!(s.payments_in_year(0), s.monthly_payment * dec!(12));
        assert_eq!(s.payments_in_year(3), Decimal::ZERO);
        assert_eq!(s.balance_after_year(2), Decimal::ZERO);
        assert!(s.balance_after_year(0) > s.balance_after_year(1));
    }

    #[test]
    fn test_zero_principal_is_empty() {
        let result = amortize(&terms(dec!(0), 3, None), Decimal::ZERO).unwrap();
        assert!(result.result.periods.is_empty());
        assert_eq!(result.result.monthly_payment, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_zero_term_with_principal_rejected() {
        assert!(amortize(&terms(dec!(90), 0, Some(dec!(12))), dec!(1000)).is_err());
    }

    #[test]
    fn test_overlong_term_rejected() {
        let err = amortize(&terms(dec!(100), 600, Some(dec!(12))), dec!(100000000)).unwrap_err();
        assert!(matches!(err, SolarFinanceError::InvalidInput { ref field, .. } if field == "term_years"));
        assert!(amortize(&terms(dec!(100), u32::MAX, Some(dec!(12))), dec!(100000000)).is_err());
    }

    #[test]
    fn test_longest_term_at_highest_rate_is_scheduled() {
        let result = amortize(&terms(dec!(100), MAX_YEARS, Some(dec!(100))), dec!(1000000)).unwrap();
        let s = &result.result;
        assert_eq!(s.term_months, 600);
        assert_eq!(s.periods.last().unwrap().closing_balance, Decimal::ZERO);
        assert!(amortize(&terms(dec!(100), 3, Some(dec!(101))), dec!(100000000)).is_err());
    }
}
