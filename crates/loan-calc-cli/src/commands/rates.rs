use serde_json::Value;

use loan_calc_core::rates::RateTable;

/// The effective rate table, one entry per category plus the policy.
pub fn run_rates(rates: &RateTable) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::json!({
        "result": rates.entries(),
        "unknown_category": rates.policy(),
    }))
}
