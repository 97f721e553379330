use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoanCalcError;
use crate::types::{Money, Months, Rate, RatePercent};
use crate::LoanCalcResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Fixed-rate annuity quote. All figures are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub principal: Money,
    pub term_months: Months,
    pub nominal_annual_rate_percent: RatePercent,
    pub monthly_rate: Rate,
    pub monthly_payment: Money,
    pub total_repayment: Money,
    pub total_interest: Money,
}

/// One period of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period_index: Months,
    pub payment_amount: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub remaining_balance: Money,
}

/// Convert a nominal annual percentage into the per-month decimal rate.
pub fn monthly_rate(nominal_annual_rate_percent: RatePercent) -> LoanCalcResult<Rate> {
    if nominal_annual_rate_percent < Decimal::ZERO {
        return Err(LoanCalcError::degenerate(format!(
            "monthly rate: negative nominal rate {nominal_annual_rate_percent}% has no annuity payment"
        )));
    }
    nominal_annual_rate_percent
        .checked_div(PERCENT)
        .and_then(|r| r.checked_div(MONTHS_PER_YEAR))
        .ok_or_else(|| LoanCalcError::degenerate("monthly rate conversion"))
}

/// Level payment that amortises `principal` over `term_months` at `monthly_rate`.
///
/// Uses the discount form `P * r / (1 - (1+r)^-n)`, or `P / n` when the rate
/// is zero. Once `(1+r)^n` leaves the decimal range the discount factor is
/// below the smallest representable step and the payment is `P * r`.
pub fn annuity_payment(principal: Money, term_months: Months, monthly_rate: Rate) -> LoanCalcResult<Money> {
    validate_principal_and_term(principal, term_months)?;

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(term_months));
    }

    let one_plus_r = Decimal::ONE
        .checked_add(monthly_rate)
        .ok_or_else(|| LoanCalcError::degenerate("annuity factor 1+r"))?;

    // Single period: the general formula reduces to P * (1+r)
    if term_months == 1 {
        return principal
            .checked_mul(one_plus_r)
            .ok_or_else(|| LoanCalcError::degenerate("annuity payment (single period)"));
    }

    let discount = match one_plus_r.checked_powu(u64::from(term_months)) {
        Some(growth) => Decimal::ONE
            .checked_div(growth)
            .ok_or_else(|| LoanCalcError::degenerate("annuity discount factor (1+r)^-n"))?,
        None => Decimal::ZERO,
    };
    let denominator = Decimal::ONE - discount;
    if denominator <= Decimal::ZERO {
        return Err(LoanCalcError::degenerate(
            "annuity denominator 1 - (1+r)^-n is not positive",
        ));
    }

    principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| LoanCalcError::degenerate("annuity payment"))
}

/// Quote the monthly payment, total repayment and total interest of a loan.
pub fn quote(
    principal: Money,
    term_months: Months,
    nominal_annual_rate_percent: RatePercent,
) -> LoanCalcResult<LoanQuote> {
    validate_principal_and_term(principal, term_months)?;
    let r = monthly_rate(nominal_annual_rate_percent)?;
    let monthly_payment = annuity_payment(principal, term_months, r)?;

    // A zero-rate loan repays exactly its principal; P / n * n would not
    // round-trip for terms that do not divide the principal.
    let total_repayment = if r.is_zero() {
        principal
    } else {
        monthly_payment
            .checked_mul(Decimal::from(term_months))
            .ok_or_else(|| LoanCalcError::degenerate("total repayment"))?
    };
    let total_interest = total_repayment - principal;

    debug!(
        %principal,
        term_months,
        rate = %nominal_annual_rate_percent,
        %monthly_payment,
        "loan quote computed"
    );

    Ok(LoanQuote {
        principal,
        term_months,
        nominal_annual_rate_percent,
        monthly_rate: r,
        monthly_payment,
        total_repayment,
        total_interest,
    })
}

/// Build the first `max_rows` periods of the schedule (all periods when `None`).
pub fn build_schedule(
    principal: Money,
    term_months: Months,
    nominal_annual_rate_percent: RatePercent,
    max_rows: Option<Months>,
) -> LoanCalcResult<Vec<AmortizationRow>> {
    let q = quote(principal, term_months, nominal_annual_rate_percent)?;
    let rows = max_rows.map_or(term_months, |m| m.min(term_months));
    Ok(AmortizationSchedule::new(&q).take(rows as usize).collect())
}

/// Period-by-period walk of an annuity loan.
///
/// Each call to `next` accrues interest on the outstanding balance and
/// applies the remainder of the level payment to principal. The sequence
/// ends after `term_months` rows; build a new one to start over.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    payment: Money,
    monthly_rate: Rate,
    balance: Money,
    period: Months,
    term_months: Months,
}

impl AmortizationSchedule {
    pub fn new(quote: &LoanQuote) -> Self {
        AmortizationSchedule {
            payment: quote.monthly_payment,
            monthly_rate: quote.monthly_rate,
            balance: quote.principal,
            period: 0,
            term_months: quote.term_months,
        }
    }
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<AmortizationRow> {
        if self.period >= self.term_months {
            return None;
        }
        self.period += 1;

        let interest = self.balance * self.monthly_rate;
        let principal = self.payment - interest;
        self.balance -= principal;

        Some(AmortizationRow {
            period_index: self.period,
            payment_amount: self.payment,
            principal_component: principal,
            interest_component: interest,
            remaining_balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.term_months - self.period) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AmortizationSchedule {}

fn validate_principal_and_term(principal: Money, term_months: Months) -> LoanCalcResult<()> {
    if principal <= Decimal::ZERO {
        return Err(LoanCalcError::invalid("principal", "Principal must be positive"));
    }
    if term_months == 0 {
        return Err(LoanCalcError::invalid(
            "term_months",
            "Term must be at least 1 month",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_monthly_rate_conversion() {
        let r = monthly_rate(dec!(3.79)).unwrap();
        assert!(close(r, dec!(0.0031583333), dec!(0.0000000001)));
        assert_eq!(monthly_rate(Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_negative_rate_is_degenerate() {
        let err = quote(dec!(1000), 12, dec!(-2)).unwrap_err();
        assert!(matches!(err, LoanCalcError::NumericDegenerate { .. }));
    }

    #[test]
    fn test_zero_rate_payment_exact() {
        let q = quote(dec!(1200), 12, Decimal::ZERO).unwrap();
        assert_eq!(q.monthly_payment, dec!(100));
        assert_eq!(q.total_repayment, dec!(1200));
        assert_eq!(q.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_indivisible_term() {
        let q = quote(dec!(1000), 3, Decimal::ZERO).unwrap();
        assert_eq!(q.monthly_payment, dec!(1000) / dec!(3));
        assert_eq!(q.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_single_period() {
        let q = quote(dec!(10000), 1, dec!(3.79)).unwrap();
        let expected = dec!(10000) * (Decimal::ONE + q.monthly_rate);
        assert_eq!(q.monthly_payment, expected);
    }

    #[test]
    fn test_very_long_term_approaches_interest_only() {
        // (1+r)^n exceeds the decimal range; the payment is the interest on P
        let q = quote(dec!(50000), 25_000, dec!(3.79)).unwrap();
        let interest_only = dec!(50000) * q.monthly_rate;
        assert!(close(q.monthly_payment, interest_only, dec!(0.000001)));
        assert!(q.total_interest > Decimal::ZERO);

        let q = quote(dec!(50000), 10_000, dec!(3.79)).unwrap();
        assert!(close(q.monthly_payment, dec!(157.9166666), dec!(0.0001)));
    }

    #[test]
    fn test_long_term_schedule_stays_finite() {
        let rows = build_schedule(dec!(50000), 30_000, dec!(3.79), Some(3)).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.remaining_balance <= dec!(50000)));
    }

    #[test]
    fn test_invalid_principal() {
        assert!(matches!(
            quote(Decimal::ZERO, 12, dec!(3)).unwrap_err(),
            LoanCalcError::InvalidArgument { .. }
        ));
        assert!(quote(dec!(-5), 12, dec!(3)).is_err());
    }

    #[test]
    fn test_invalid_term() {
        assert!(matches!(
            quote(dec!(1000), 0, dec!(3)).unwrap_err(),
            LoanCalcError::InvalidArgument { .. }
        ));
        assert!(build_schedule(dec!(1000), 0, dec!(3), Some(6)).is_err());
    }

    #[test]
    fn test_schedule_iterator_len() {
        let q = quote(dec!(5000), 9, dec!(3.29)).unwrap();
        let mut it = AmortizationSchedule::new(&q);
        assert_eq!(it.len(), 9);
        it.next();
        assert_eq!(it.len(), 8);
        assert_eq!(it.count(), 8);
    }

    #[test]
    fn test_max_rows_larger_than_term() {
        let rows = build_schedule(dec!(1000), 3, dec!(2.89), Some(6)).unwrap();
        assert_eq!(rows.len(), 3);
        let rows = build_schedule(dec!(1000), 3, dec!(2.89), Some(0)).unwrap();
        assert!(rows.is_empty());
    }
}
