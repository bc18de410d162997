use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SolarFinanceError;
use crate::financing::{amortize, AmortizationSchedule, FinancingTerms, InvestmentSplit};
use crate::savings::YearlyProjection;
use crate::time_value;
use crate::types::*;
use crate::SolarFinanceResult;

/// Which outlay ROI, IRR and payback are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnBasis {
    /// The customer's cash outlay; loan payments reduce yearly savings.
    #[default]
    UpfrontPayment,
    /// The whole project cost; financing is ignored.
    TotalInvestment,
}

/// Input for investment evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub projections: Vec<YearlyProjection>,
    /// Total investment including VAT
    pub total_investment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financing: Option<FinancingTerms>,
    #[serde(default)]
    pub return_basis: ReturnBasis,
}

/// Output of investment evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentMetrics {
    pub total_investment: Money,
    pub upfront_payment: Money,
    pub financed_amount: Money,
    pub monthly_loan_payment: Money,
    pub total_interest: Money,
    pub return_basis: ReturnBasis,
    /// Outlay the returns are measured against
    pub capital_invested: Money,
    /// Bill savings net of maintenance, before loan payments
    pub total_lifetime_savings: Money,
    pub total_debt_service: Money,
    /// Savings net of maintenance and, on the upfront basis, loan payments
    pub net_lifetime_savings: Money,
    pub savings_during_loan_term: Money,
    pub savings_after_loan_term: Money,
    /// Net lifetime savings as a percentage of capital invested
    pub roi_pct: Option<Percent>,
    pub irr: Option<Rate>,
    /// Years until the outlay is recovered (and any loan repaid)
    pub payback_years: Option<Years>,
    pub cash_flows: Vec<Money>,
    pub cumulative_net_savings: Vec<Money>,
}

/// Evaluate ROI, IRR and payback for a savings projection, optionally
/// financed by an installment loan.
///
/// Cash flows put the outlay in year 0 alongside that year's net savings.
/// With nothing financed the result is identical to a cash purchase.
pub fn evaluate(input: &EvaluationInput) -> SolarFinanceResult<ComputationOutput<InvestmentMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.projections.is_empty() {
        return Err(SolarFinanceError::InvalidInput {
            field: "projections".into(),
            reason: "At least one projected year is required".into(),
        });
    }
    if input.total_investment < Decimal::ZERO {
        return Err(SolarFinanceError::InvalidInput {
            field: "total_investment".into(),
            reason: "Investment cannot be negative".into(),
        });
    }

    let horizon = input.projections.len() as u32;
    let split = match &input.financing {
        Some(terms) => terms.split(input.total_investment)?,
        None => InvestmentSplit {
            total_investment: input.total_investment,
            financed_amount: Decimal::ZERO,
            upfront_payment: input.total_investment,
        },
    };

    let schedule: Option<AmortizationSchedule> = match &input.financing {
        Some(terms) if !split.financed_amount.is_zero() => {
            if terms.term_years > horizon {
                return Err(SolarFinanceError::InvalidInput {
                    field: "term_years".into(),
                    reason: format!("Loan term exceeds the {horizon}-year projection"),
                });
            }
            let amortized = amortize(terms, split.financed_amount)?;
            Some(amortized.result)
        }
        _ => None,
    };

    let loan_years = schedule
        .as_ref()
        .map(|s| s.years.len() as u32)
        .unwrap_or(0);
    let debt_service = |year: u32| -> Money {
        schedule
            .as_ref()
            .map(|s| s.payments_in_year(year))
            .unwrap_or_default()
    };

    let (capital_invested, include_debt) = match input.return_basis {
        ReturnBasis::UpfrontPayment => (split.upfront_payment, true),
        ReturnBasis::TotalInvestment => (split.total_investment, false),
    };

    let net: Vec<Money> = input
        .projections
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if include_debt {
                p.annual_savings - debt_service(i as u32)
            } else {
                p.annual_savings
            }
        })
        .collect();

    let total_lifetime_savings: Money = input.projections.iter().map(|p| p.annual_savings).sum();
    let total_debt_service: Money = (0..horizon).map(|y| debt_service(y)).sum();
    let net_lifetime_savings: Money = net.iter().copied().sum();
    let savings_during_loan_term: Money = net.iter().take(loan_years as usize).copied().sum();
    let savings_after_loan_term = net_lifetime_savings - savings_during_loan_term;

    let mut cash_flows = net.clone();
    cash_flows[0] -= capital_invested;

    let mut cumulative_net_savings = Vec::with_capacity(net.len());
    let mut running = Decimal::ZERO;
    for n in &net {
        running += n;
        cumulative_net_savings.push(running);
    }

    // ROI
    let roi_pct = if capital_invested.is_zero() {
        warnings.push("No capital invested up front; ROI is undefined".into());
        None
    } else {
        Some(net_lifetime_savings / capital_invested * dec!(100))
    };

    // IRR
    let irr = match time_value::irr(&cash_flows) {
        Ok(r) => Some(r),
        Err(e) => {
            warnings.push(format!("IRR undefined: {e}"));
            None
        }
    };

    // Payback
    let debt_free_from = if include_debt { loan_years as usize } else { 0 };
    let payback_years = payback_period(capital_invested, &net, &cumulative_net_savings, debt_free_from);
    if payback_years.is_none() {
        warnings.push(format!(
            "Capital is not recovered within the {horizon}-year projection"
        ));
    }

    tracing::debug!(
        capital_invested = %capital_invested,
        net_lifetime_savings = %net_lifetime_savings,
        irr = ?irr,
        payback_years = ?payback_years,
        "evaluated investment"
    );

    let output = InvestmentMetrics {
        total_investment: split.total_investment,
        upfront_payment: split.upfront_payment,
        financed_amount: split.financed_amount,
        monthly_loan_payment: schedule.as_ref().map(|s| s.monthly_payment).unwrap_or_default(),
        total_interest: schedule.as_ref().map(|s| s.total_interest).unwrap_or_default(),
        return_basis: input.return_basis,
        capital_invested,
        total_lifetime_savings,
        total_debt_service,
        net_lifetime_savings,
        savings_during_loan_term,
        savings_after_loan_term,
        roi_pct,
        irr,
        payback_years,
        cash_flows,
        cumulative_net_savings,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Solar Investment Evaluation: ROI, IRR (bisection), interpolated payback",
        serde_json::json!({
            "total_investment": input.total_investment.to_string(),
            "return_basis": input.return_basis,
            "financing": input.financing,
            "years": horizon,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// First year in which cumulative savings reach `capital` with no loan
/// outstanding, interpolated linearly within that year.
///
/// `debt_free_from` is the number of years the loan runs. If the capital is
/// already covered when the loan ends, payback is the payoff year; otherwise
/// the search continues from there.
fn payback_period(capital: Money, net: &[Money], cumulative: &[Money], debt_free_from: usize) -> Option<Years> {
    if debt_free_from > 0 {
        if *cumulative.get(debt_free_from - 1)? >= capital {
            return Some(Decimal::from(debt_free_from as u32));
        }
    } else if capital <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    let year = (debt_free_from..cumulative.len()).find(|&y| cumulative[y] >= capital)?;
    let before = if year == 0 { Decimal::ZERO } else { cumulative[year - 1] };
    let in_year = net[year];
    if in_year <= Decimal::ZERO {
        return Some(Decimal::from(year as u32));
    }
    Some(Decimal::from(year as u32) + (capital - before) / in_year)
}
