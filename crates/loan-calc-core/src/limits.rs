use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Months};

/// Product limits for the calculator.
///
/// These are advisory: a request outside them is still quoted, with a
/// warning attached to the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanLimits {
    pub min_principal: Money,
    pub max_principal: Money,
    pub principal_step: Money,
    pub term_options: Vec<Months>,
    /// Principals up to this amount may not exceed `short_loan_max_term`
    pub short_loan_ceiling: Money,
    pub short_loan_max_term: Months,
}

impl Default for LoanLimits {
    fn default() -> Self {
        LoanLimits {
            min_principal: dec!(1000),
            max_principal: dec!(450000),
            principal_step: dec!(1000),
            term_options: vec![3, 6, 9, 12, 36],
            short_loan_ceiling: dec!(125000),
            short_loan_max_term: 36,
        }
    }
}

impl LoanLimits {
    pub fn check(&self, principal: Money, term_months: Months) -> Vec<String> {
        let mut warnings = Vec::new();

        if principal < self.min_principal || principal > self.max_principal {
            warnings.push(format!(
                "Principal {principal} is outside the offered range {}-{}",
                self.min_principal, self.max_principal
            ));
        }
        if self.principal_step > Decimal::ZERO && !(principal % self.principal_step).is_zero() {
            warnings.push(format!(
                "Principal {principal} is not a multiple of {}",
                self.principal_step
            ));
        }
        if !self.term_options.is_empty() && !self.term_options.contains(&term_months) {
            warnings.push(format!(
                "Term of {term_months} months is not one of the offered terms {:?}",
                self.term_options
            ));
        }
        if principal <= self.short_loan_ceiling && term_months > self.short_loan_max_term {
            warnings.push(format!(
                "Loans up to {} are limited to {} months; requested {term_months}",
                self.short_loan_ceiling, self.short_loan_max_term
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offered_request_has_no_warnings() {
        let limits = LoanLimits::default();
        assert!(limits.check(dec!(50000), 36).is_empty());
        assert!(limits.check(dec!(1000), 3).is_empty());
        assert!(limits.check(dec!(450000), 12).is_empty());
    }

    #[test]
    fn test_out_of_range_principal() {
        let w = LoanLimits::default().check(dec!(500), 12);
        assert_eq!(w.len(), 2); // below minimum and off-step
        assert!(w[0].contains("outside the offered range"));
    }

    #[test]
    fn test_unlisted_term() {
        let w = LoanLimits::default().check(dec!(200000), 24);
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("24 months"));
    }

    #[test]
    fn test_short_loan_term_cap() {
        let limits = LoanLimits {
            term_options: vec![],
            ..LoanLimits::default()
        };
        let w = limits.check(dec!(100000), 48);
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("limited to 36 months"));
        assert!(limits.check(dec!(200000), 48).is_empty());
    }
}
