use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::types::{Money, Rate};
use crate::LoanCalcResult;

/// One-off charges quoted with every loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub file_fee: Money,
    pub appraisal_fee: Money,
    /// Optional credit life insurance, as a fraction of principal
    pub insurance_rate: Rate,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            file_fee: dec!(150),
            appraisal_fee: Decimal::ZERO,
            insurance_rate: dec!(0.002),
        }
    }
}

/// Costs and fees shown next to the payment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanCosts {
    pub file_fee: Money,
    pub appraisal_fee: Money,
    /// Premium if the borrower opts in; quoted either way
    pub insurance_premium: Money,
    pub insurance_included: bool,
    pub total_interest: Money,
    pub total_fees: Money,
    /// Interest plus fees, i.e. everything paid beyond the principal
    pub total_cost_of_credit: Money,
}

pub fn loan_costs(
    principal: Money,
    total_interest: Money,
    fees: &FeeSchedule,
    include_insurance: bool,
) -> LoanCalcResult<LoanCosts> {
    if principal <= Decimal::ZERO {
        return Err(LoanCalcError::invalid("principal", "Principal must be positive"));
    }
    if fees.file_fee < Decimal::ZERO || fees.appraisal_fee < Decimal::ZERO {
        return Err(LoanCalcError::invalid("fees", "Fees must not be negative"));
    }
    if fees.insurance_rate < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "insurance_rate",
            "Insurance rate must not be negative",
        ));
    }

    let insurance_premium = principal
        .checked_mul(fees.insurance_rate)
        .ok_or_else(|| LoanCalcError::degenerate("insurance premium"))?;
    let mut total_fees = fees
        .file_fee
        .checked_add(fees.appraisal_fee)
        .ok_or_else(|| LoanCalcError::degenerate("total fees"))?;
    if include_insurance {
        total_fees = total_fees
            .checked_add(insurance_premium)
            .ok_or_else(|| LoanCalcError::degenerate("total fees with insurance"))?;
    }
    let total_cost_of_credit = total_interest
        .checked_add(total_fees)
        .ok_or_else(|| LoanCalcError::degenerate("total cost of credit"))?;

    Ok(LoanCosts {
        file_fee: fees.file_fee,
        appraisal_fee: fees.appraisal_fee,
        insurance_premium,
        insurance_included: include_insurance,
        total_interest,
        total_fees,
        total_cost_of_credit,
    })
}
