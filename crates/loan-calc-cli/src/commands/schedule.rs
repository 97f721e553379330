use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::quote::{self, ScheduleInput, DEFAULT_SCHEDULE_ROWS};
use loan_calc_core::rates::{RateLookup, RateTable};

use crate::input;

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "months")]
    pub term: Option<u32>,

    /// Nominal annual rate in percent (e.g. 3.79)
    #[arg(long, conflicts_with = "category")]
    pub rate: Option<Decimal>,

    /// Take the rate from the rate table for this category
    #[arg(long)]
    pub category: Option<String>,

    /// Number of leading periods to show
    #[arg(long, default_value_t = DEFAULT_SCHEDULE_ROWS)]
    pub rows: u32,

    /// Show every period
    #[arg(long)]
    pub all: bool,
}

pub fn run_schedule(args: ScheduleArgs, rates: &RateTable) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(request) = input::stdin::read_piped_request()? {
        request
    } else {
        let rate = match (args.rate, args.category.as_deref()) {
            (Some(rate), _) => rate,
            (None, Some(name)) => rates.resolve(name)?.nominal_annual_rate_percent,
            (None, None) => return Err("--rate or --category is required (or provide --input)".into()),
        };
        ScheduleInput {
            principal: args.principal
                .ok_or("--principal is required (or provide --input)")?,
            term_months: args.term.ok_or("--term is required (or provide --input)")?,
            nominal_annual_rate_percent: rate,
            max_rows: if args.all { None } else { Some(args.rows) },
        }
    };

    let result = quote::calculate_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
