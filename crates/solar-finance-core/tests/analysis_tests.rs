#![cfg(feature = "analysis")]

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use solar_finance_core::analysis::{self, SolarAnalysisInput};
use solar_finance_core::evaluation::ReturnBasis;
use solar_finance_core::tariff::{find_province, PROVINCES};
use solar_finance_core::SolarFinanceError;

fn from_json(json: serde_json::Value) -> SolarAnalysisInput {
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_end_to_end_reference_customer() {
    let input = from_json(serde_json::json!({
        "province": "Hà Nội",
        "monthly_bill_with_vat": "1948508",
        "capacity_kwp": "4.78",
        "financing": { "installment_share_pct": "90", "term_years": 3 }
    }));
    let output = analysis::analyze(&input).unwrap();
    let a = &output.result;

    assert_eq!(a.province, "Hà Nội");
    assert_eq!(a.monthly_consumption_kwh, dec!(636));
    assert_eq!(a.total_investment, dec!(51624000));
    assert_eq!(a.savings.years.len(), 20);
    assert_eq!(a.savings.years[0].production_kwh, dec!(549.7) * dec!(12));
    assert_eq!(a.metrics.upfront_payment, dec!(5162400));
    assert_eq!(a.metrics.return_basis, ReturnBasis::UpfrontPayment);
    assert_eq!(output.metadata.precision, "rust_decimal_128bit");
}

#[test]
fn test_output_serializes_decimals_as_strings() {
    let input = from_json(serde_json::json!({
        "province": "ha-noi",
        "monthly_bill_with_vat": "1948508",
        "capacity_kwp": "4.78"
    }));
    let output = analysis::analyze(&input).unwrap();
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["result"]["total_investment"], serde_json::json!("51624000"));
    assert_eq!(json["result"]["category"], serde_json::json!("residential"));
}

#[test]
fn test_every_province_can_be_analysed() {
    for profile in PROVINCES.iter() {
        let input = from_json(serde_json::json!({
            "province": profile.name,
            "monthly_bill_with_vat": "2500000"
        }));
        let output = analysis::analyze(&input).unwrap();
        assert!(output.result.recommended_capacity_kwp > Decimal::ZERO, "{}", profile.name);
    }
}

#[test]
fn test_sunnier_province_needs_smaller_system() {
    let north = find_province("Lào Cai").unwrap();
    let south = find_province("Ninh Thuận").unwrap();
    assert!(south.annual_yield_per_kwp > north.annual_yield_per_kwp);

    let size = |name: &str| {
        let input = from_json(serde_json::json!({
            "province": name,
            "monthly_consumption_kwh": "800"
        }));
        analysis::analyze(&input).unwrap().result.recommended_capacity_kwp
    };
    assert!(size("Ninh Thuận") < size("Lào Cai"));
}

#[test]
fn test_total_basis_ignores_financing() {
    let financed = |basis: &str| {
        let input = from_json(serde_json::json!({
            "province": "Hà Nội",
            "monthly_bill_with_vat": "1948508",
            "capacity_kwp": "4.78",
            "financing": { "installment_share_pct": "90", "term_years": 3 },
            "return_basis": basis
        }));
        analysis::analyze(&input).unwrap().result.metrics
    };
    let cash = {
        let input = from_json(serde_json::json!({
            "province": "Hà Nội",
            "monthly_bill_with_vat": "1948508",
            "capacity_kwp": "4.78"
        }));
        analysis::analyze(&input).unwrap().result.metrics
    };
    let project = financed("total_investment");
    assert_eq!(project.roi_pct, cash.roi_pct);
    assert_eq!(project.payback_years, cash.payback_years);
    assert!(financed("upfront_payment").roi_pct > cash.roi_pct);
}

#[test]
fn test_unknown_loan_term_is_not_found() {
    let input = from_json(serde_json::json!({
        "province": "Hà Nội",
        "monthly_bill_with_vat": "1948508",
        "financing": { "installment_share_pct": "90", "term_years": 10 }
    }));
    let err = analysis::analyze(&input).unwrap_err();
    assert!(matches!(err, SolarFinanceError::NotFound { .. }));
}
