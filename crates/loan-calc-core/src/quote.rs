use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::{self, AmortizationRow, AmortizationSchedule, LoanQuote};
use crate::costs::{self, FeeSchedule, LoanCosts};
use crate::error::LoanCalcError;
use crate::format::{self, DisplayCosts, DisplayPrecision, DisplayQuote, DisplayRow};
use crate::limits::LoanLimits;
use crate::rates::{LoanCategory, RateLookup};
use crate::types::*;
use crate::LoanCalcResult;

/// Rows shown in the payment plan unless the caller asks for more
pub const DEFAULT_SCHEDULE_ROWS: Months = 6;

/// A request for a loan quote, as submitted by the calculator page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuoteInput {
    pub principal: Money,
    pub term_months: Months,
    /// Raw category name; resolved through the rate table's policy
    pub loan_category: String,
    /// Schedule rows to return (defaults to 6, capped at the term)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_rows: Option<Months>,
    #[serde(default)]
    pub include_insurance: bool,
    #[serde(default)]
    pub fees: FeeSchedule,
    #[serde(default)]
    pub limits: LoanLimits,
    #[serde(default)]
    pub precision: DisplayPrecision,
}

impl LoanQuoteInput {
    pub fn new(principal: Money, term_months: Months, loan_category: impl Into<String>) -> Self {
        LoanQuoteInput {
            principal,
            term_months,
            loan_category: loan_category.into(),
            schedule_rows: None,
            include_insurance: false,
            fees: FeeSchedule::default(),
            limits: LoanLimits::default(),
            precision: DisplayPrecision::default(),
        }
    }
}

/// Rounded figures ready for presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuoteDisplay {
    pub quote: DisplayQuote,
    pub schedule: Vec<DisplayRow>,
    pub costs: DisplayCosts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuoteOutput {
    pub loan_category: LoanCategory,
    pub quote: LoanQuote,
    pub schedule: Vec<AmortizationRow>,
    /// True when fewer rows than the full term were returned
    pub schedule_truncated: bool,
    pub costs: LoanCosts,
    pub display: LoanQuoteDisplay,
}

/// Resolve the rate, quote the loan, build the schedule prefix and costs,
/// then round everything for display.
pub fn calculate_loan_quote(
    input: &LoanQuoteInput,
    rates: &impl RateLookup,
) -> LoanCalcResult<ComputationOutput<LoanQuoteOutput>> {
    let start = Instant::now();
    let mut warnings = input.limits.check(input.principal, input.term_months);

    let entry = rates.resolve(&input.loan_category)?;
    if input.loan_category.parse::<LoanCategory>().ok() != Some(entry.category) {
        warnings.push(format!(
            "Unknown loan category '{}'; quoted at the {} rate",
            input.loan_category, entry.category
        ));
    }

    let quote = amortization::quote(
        input.principal,
        input.term_months,
        entry.nominal_annual_rate_percent,
    )?;

    let rows = input
        .schedule_rows
        .unwrap_or(DEFAULT_SCHEDULE_ROWS)
        .min(quote.term_months);
    let schedule: Vec<AmortizationRow> =
        AmortizationSchedule::new(&quote).take(rows as usize).collect();
    let schedule_truncated = rows < quote.term_months;

    let costs = costs::loan_costs(
        quote.principal,
        quote.total_interest,
        &input.fees,
        input.include_insurance,
    )?;

    let places = input.precision.amount_places;
    let display = LoanQuoteDisplay {
        quote: format::format_quote(&quote, &input.precision),
        schedule: format::format_schedule(&schedule, places),
        costs: format::format_costs(&costs, places),
    };

    debug!(
        category = %entry.category,
        rows = schedule.len(),
        schedule_truncated,
        "loan quote assembled"
    );

    let output = LoanQuoteOutput {
        loan_category: entry.category,
        quote,
        schedule,
        schedule_truncated,
        costs,
        display,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity (level monthly payment)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "term_months": input.term_months,
            "loan_category": entry.category,
            "nominal_annual_rate_percent": entry.nominal_annual_rate_percent.to_string(),
            "compounding": "monthly, nominal rate / 12",
            "rounding": "half up, applied after all totals are computed",
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Input for a standalone schedule request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    pub term_months: Months,
    pub nominal_annual_rate_percent: RatePercent,
    /// `None` returns every period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<Months>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_payment: Money,
    pub rows: Vec<AmortizationRow>,
    pub total_interest_shown: Money,
    pub total_principal_shown: Money,
}

/// Amortization schedule for an explicit rate, without category lookup.
pub fn calculate_schedule(input: &ScheduleInput) -> LoanCalcResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    if input.max_rows == Some(0) {
        return Err(LoanCalcError::invalid(
            "max_rows",
            "At least one row must be requested",
        ));
    }

    let quote = amortization::quote(
        input.principal,
        input.term_months,
        input.nominal_annual_rate_percent,
    )?;
    let shown = input
        .max_rows
        .map_or(quote.term_months, |m| m.min(quote.term_months));
    let rows: Vec<AmortizationRow> =
        AmortizationSchedule::new(&quote).take(shown as usize).collect();
    if rows.len() < input.term_months as usize {
        warnings.push(format!(
            "Showing first {} of {} periods",
            rows.len(),
            input.term_months
        ));
    }

    let total_interest_shown: Money = rows.iter().map(|r| r.interest_component).sum();
    let total_principal_shown: Money = rows.iter().map(|r| r.principal_component).sum();

    let output = ScheduleOutput {
        monthly_payment: quote.monthly_payment,
        rows,
        total_interest_shown,
        total_principal_shown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity amortization schedule",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "term_months": input.term_months,
            "nominal_annual_rate_percent": input.nominal_annual_rate_percent.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{RateTable, UnknownCategoryPolicy};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_quote() {
        let input = LoanQuoteInput::new(dec!(50000), 36, "personal");
        let out = calculate_loan_quote(&input, &RateTable::default()).unwrap();
        let r = &out.result;

        assert_eq!(r.loan_category, LoanCategory::Personal);
        assert_eq!(r.quote.nominal_annual_rate_percent, dec!(3.79));
        assert_eq!(r.schedule.len(), 6);
        assert!(r.schedule_truncated);
        assert_eq!(r.display.schedule.len(), 6);
        assert_eq!(r.display.quote.monthly_payment, dec!(1471.53));
        assert_eq!(r.display.schedule[0].payment_amount, dec!(1472));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_short_term_not_truncated() {
        let mut input = LoanQuoteInput::new(dec!(1000), 3, "konut");
        input.schedule_rows = Some(6);
        let out = calculate_loan_quote(&input, &RateTable::default()).unwrap();
        assert_eq!(out.result.loan_category, LoanCategory::Housing);
        assert_eq!(out.result.schedule.len(), 3);
        assert!(!out.result.schedule_truncated);
        assert_eq!(out.result.display.schedule[2].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_category_rejected_by_default() {
        let input = LoanQuoteInput::new(dec!(1000), 3, "business");
        assert!(calculate_loan_quote(&input, &RateTable::default()).is_err());
    }

    #[test]
    fn test_unknown_category_fallback_warns() {
        let table = RateTable::default()
            .with_policy(UnknownCategoryPolicy::Fallback {
                category: LoanCategory::Personal,
            })
            .unwrap();
        let input = LoanQuoteInput::new(dec!(10000), 12, "business");
        let out = calculate_loan_quote(&input, &table).unwrap();
        assert_eq!(out.result.loan_category, LoanCategory::Personal);
        assert_eq!(out.result.quote.nominal_annual_rate_percent, dec!(3.79));
        assert!(out.warnings.iter().any(|w| w.contains("business")));
    }

    #[test]
    fn test_limit_warnings_do_not_fail() {
        let input = LoanQuoteInput::new(dec!(500000), 24, "vehicle");
        let out = calculate_loan_quote(&input, &RateTable::default()).unwrap();
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_input_defaults_from_json() {
        let json = r#"{ "principal": "50000", "term_months": 36, "loan_category": "ihtiyac" }"#;
        let input: LoanQuoteInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.schedule_rows, None);
        assert!(!input.include_insurance);
        assert_eq!(input.fees, FeeSchedule::default());
        assert_eq!(input.precision, DisplayPrecision::default());
    }

    #[test]
    fn test_schedule_full_and_prefix() {
        let mut input = ScheduleInput {
            principal: dec!(50000),
            term_months: 36,
            nominal_annual_rate_percent: dec!(3.79),
            max_rows: Some(6),
        };
        let out = calculate_schedule(&input).unwrap();
        assert_eq!(out.result.rows.len(), 6);
        assert_eq!(out.warnings.len(), 1);

        input.max_rows = None;
        let out = calculate_schedule(&input).unwrap();
        assert_eq!(out.result.rows.len(), 36);
        assert!((out.result.total_principal_shown - dec!(50000)).abs() < dec!(0.000001));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_schedule_zero_rows_rejected() {
        let input = ScheduleInput {
            principal: dec!(1000),
            term_months: 3,
            nominal_annual_rate_percent: dec!(2.89),
            max_rows: Some(0),
        };
        let err = calculate_schedule(&input).unwrap_err();
        assert!(matches!(err, LoanCalcError::InvalidArgument { ref field, .. } if field == "max_rows"));
    }

    #[test]
    fn test_schedule_rows_match_quoted_payment() {
        let input = ScheduleInput {
            principal: dec!(12000),
            term_months: 12,
            nominal_annual_rate_percent: dec!(3.29),
            max_rows: Some(20),
        };
        let out = calculate_schedule(&input).unwrap();
        assert_eq!(out.result.rows.len(), 12);
        assert!(out.warnings.is_empty());
        assert!(out
            .result
            .rows
            .iter()
            .all(|r| r.payment_amount == out.result.monthly_payment));
    }
}
