use loan_calc_core::quote::{self, LoanQuoteInput, DEFAULT_SCHEDULE_ROWS};
use loan_calc_core::rates::{LoanCategory, RateTable, UnknownCategoryPolicy};
use loan_calc_core::LoanCalcError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fallback_table() -> RateTable {
    RateTable::default()
        .with_policy(UnknownCategoryPolicy::Fallback {
            category: LoanCategory::Personal,
        })
        .unwrap()
}

#[test]
fn test_quote_envelope() {
    let input = LoanQuoteInput::new(dec!(50000), 36, "personal");
    let out = quote::calculate_loan_quote(&input, &RateTable::default()).unwrap();

    assert_eq!(out.methodology, "Fixed-rate annuity (level monthly payment)");
    assert_eq!(out.assumptions["term_months"], 36);
    assert_eq!(out.assumptions["loan_category"], "personal");
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}

#[test]
fn test_payment_plan_figures() {
    let input = LoanQuoteInput::new(dec!(50000), 36, "personal");
    let out = quote::calculate_loan_quote(&input, &RateTable::default()).unwrap();
    let shown = &out.result.display;

    assert_eq!(shown.quote.principal, dec!(50000));
    assert_eq!(shown.quote.nominal_annual_rate_percent, dec!(3.79));
    assert_eq!(shown.quote.total_repayment, dec!(52975));
    assert_eq!(shown.quote.total_interest, dec!(2975));
    assert_eq!(shown.schedule.len(), DEFAULT_SCHEDULE_ROWS as usize);

    // File fee 150, insurance 0.2% quoted but not included
    assert_eq!(shown.costs.file_fee, dec!(150));
    assert_eq!(shown.costs.insurance_premium, dec!(100));
    assert_eq!(shown.costs.total_fees, dec!(150));
    assert_eq!(shown.costs.total_cost_of_credit, dec!(3125));
}

#[test]
fn test_insurance_opt_in() {
    let mut input = LoanQuoteInput::new(dec!(50000), 36, "personal");
    input.include_insurance = true;
    let out = quote::calculate_loan_quote(&input, &RateTable::default()).unwrap();
    assert_eq!(out.result.display.costs.total_fees, dec!(250));
}

#[test]
fn test_full_schedule_on_request() {
    let mut input = LoanQuoteInput::new(dec!(12000), 12, "vehicle");
    input.schedule_rows = Some(12);
    let out = quote::calculate_loan_quote(&input, &RateTable::default()).unwrap();

    assert_eq!(out.result.schedule.len(), 12);
    assert!(!out.result.schedule_truncated);
    assert_eq!(out.result.display.schedule[11].remaining_balance, Decimal::ZERO);
}

#[test]
fn test_display_precision_override() {
    let mut input = LoanQuoteInput::new(dec!(50000), 36, "personal");
    input.precision.amount_places = 2;
    let out = quote::calculate_loan_quote(&input, &RateTable::default()).unwrap();
    assert_eq!(out.result.display.schedule[0].interest_component, dec!(157.92));
}

#[test]
fn test_strict_table_rejects_unknown_category() {
    let input = LoanQuoteInput::new(dec!(10000), 12, "student");
    let err = quote::calculate_loan_quote(&input, &RateTable::default()).unwrap_err();
    assert!(matches!(err, LoanCalcError::InvalidArgument { .. }));
}

#[test]
fn test_fallback_table_quotes_personal_rate() {
    let input = LoanQuoteInput::new(dec!(10000), 12, "student");
    let out = quote::calculate_loan_quote(&input, &fallback_table()).unwrap();
    assert_eq!(out.result.loan_category, LoanCategory::Personal);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_product_code_aliases() {
    let table = RateTable::default();
    for (code, expected) in [
        ("ihtiyac", dec!(3.79)),
        ("konut", dec!(2.89)),
        ("tasit", dec!(3.29)),
    ] {
        let input = LoanQuoteInput::new(dec!(10000), 12, code);
        let out = quote::calculate_loan_quote(&input, &table).unwrap();
        assert_eq!(out.result.quote.nominal_annual_rate_percent, expected);
        assert!(out.warnings.is_empty());
    }
}

#[test]
fn test_quote_from_json_request() {
    let json = r#"{
        "principal": 25000,
        "term_months": 9,
        "loan_category": "vehicle",
        "schedule_rows": 3,
        "include_insurance": true
    }"#;
    let input: LoanQuoteInput = serde_json::from_str(json).unwrap();
    let out = quote::calculate_loan_quote(&input, &RateTable::default()).unwrap();
    assert_eq!(out.result.schedule.len(), 3);
    assert!(out.result.schedule_truncated);
    assert_eq!(out.result.costs.insurance_premium, dec!(50));

    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["result"]["loan_category"], "vehicle");
}

#[test]
fn test_oversized_fee_reported_not_panicking() {
    let mut input = LoanQuoteInput::new(dec!(50000), 36, "personal");
    input.fees.file_fee = Decimal::MAX;
    input.fees.appraisal_fee = dec!(1);
    let err = quote::calculate_loan_quote(&input, &RateTable::default()).unwrap_err();
    assert!(matches!(err, LoanCalcError::NumericDegenerate { .. }));
}
