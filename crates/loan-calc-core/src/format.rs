//! Display rounding for quotes and schedules.
//!
//! Everything here works on finished figures: totals and balances are
//! computed unrounded by [`crate::amortization`] and only rounded on the
//! way out, so rounding error never compounds across periods.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationRow, LoanQuote};
use crate::costs::LoanCosts;
use crate::types::{Money, Months, RatePercent};

/// Decimal places shown for quoted rates ("3.79")
pub const RATE_DISPLAY_PLACES: u32 = 2;

/// How many decimal places each kind of figure is shown with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPrecision {
    /// Totals, fees and schedule columns (whole currency units by default)
    pub amount_places: u32,
    /// The headline monthly installment
    pub installment_places: u32,
}

impl Default for DisplayPrecision {
    fn default() -> Self {
        DisplayPrecision {
            amount_places: 0,
            installment_places: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayQuote {
    pub principal: Money,
    pub term_months: Months,
    pub nominal_annual_rate_percent: RatePercent,
    pub monthly_payment: Money,
    pub total_repayment: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub period_index: Months,
    pub payment_amount: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub remaining_balance: Money,
}

/// Round to `places` decimals with halves going towards positive infinity.
///
/// Applying it twice gives the same value as applying it once. A negative
/// residual that rounds to zero comes back as plain zero.
pub fn round_half_up(value: Decimal, places: u32) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    let rounded = value.round_dp_with_strategy(places, strategy);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

pub fn format_quote(quote: &LoanQuote, precision: &DisplayPrecision) -> DisplayQuote {
    DisplayQuote {
        principal: round_half_up(quote.principal, precision.amount_places),
        term_months: quote.term_months,
        nominal_annual_rate_percent: round_half_up(
            quote.nominal_annual_rate_percent,
            RATE_DISPLAY_PLACES,
        ),
        monthly_payment: round_half_up(quote.monthly_payment, precision.installment_places),
        total_repayment: round_half_up(quote.total_repayment, precision.amount_places),
        total_interest: round_half_up(quote.total_interest, precision.amount_places),
    }
}

pub fn format_schedule(rows: &[AmortizationRow], places: u32) -> Vec<DisplayRow> {
    rows.iter()
        .map(|row| DisplayRow {
            period_index: row.period_index,
            payment_amount: round_half_up(row.payment_amount, places),
            principal_component: round_half_up(row.principal_component, places),
            interest_component: round_half_up(row.interest_component, places),
            remaining_balance: round_half_up(row.remaining_balance, places),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCosts {
    pub file_fee: Money,
    pub appraisal_fee: Money,
    pub insurance_premium: Money,
    pub total_interest: Money,
    pub total_fees: Money,
    pub total_cost_of_credit: Money,
}

pub fn format_costs(costs: &LoanCosts, places: u32) -> DisplayCosts {
    DisplayCosts {
        file_fee: round_half_up(costs.file_fee, places),
        appraisal_fee: round_half_up(costs.appraisal_fee, places),
        insurance_premium: round_half_up(costs.insurance_premium, places),
        total_interest: round_half_up(costs.total_interest, places),
        total_fees: round_half_up(costs.total_fees, places),
        total_cost_of_credit: round_half_up(costs.total_cost_of_credit, places),
    }
}

/// Render an amount with grouped thousands, e.g. `50.000` or `1.471,53`.
pub fn group_thousands(value: Decimal, thousands_sep: char, decimal_sep: char) -> String {
    let text = value.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(thousands_sep);
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push(decimal_sep);
        out.push_str(frac);
    }
    out
}
