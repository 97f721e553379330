use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::quote::{self, LoanQuoteInput};
use loan_calc_core::rates::RateTable;

use crate::input;

/// Arguments for a loan quote
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "months")]
    pub term: Option<u32>,

    /// Loan category: personal, housing or vehicle
    #[arg(long, default_value = "personal")]
    pub category: String,

    /// Schedule rows to show (default 6)
    #[arg(long)]
    pub rows: Option<u32>,

    /// Show every period of the schedule
    #[arg(long, conflicts_with = "rows")]
    pub all: bool,

    /// Include the optional insurance premium in the fees
    #[arg(long)]
    pub insurance: bool,
}

pub fn run_quote(args: QuoteArgs, rates: &RateTable) -> Result<Value, Box<dyn std::error::Error>> {
    let mut quote_input: LoanQuoteInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(request) = input::stdin::read_piped_request()? {
        request
    } else {
        let mut built = LoanQuoteInput::new(
            args.principal
                .ok_or("--principal is required (or provide --input)")?,
            args.term.ok_or("--term is required (or provide --input)")?,
            args.category.as_str(),
        );
        built.schedule_rows = args.rows;
        built.include_insurance = args.insurance;
        built
    };

    if args.all {
        quote_input.schedule_rows = Some(quote_input.term_months);
    }

    let result = quote::calculate_loan_quote(&quote_input, rates)?;
    Ok(serde_json::to_value(result)?)
}
