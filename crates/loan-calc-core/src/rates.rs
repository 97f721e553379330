use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LoanCalcError;
use crate::types::RatePercent;
use crate::LoanCalcResult;

/// Loan product category offered by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanCategory {
    #[serde(alias = "ihtiyac")]
    Personal,
    #[serde(alias = "konut")]
    Housing,
    #[serde(alias = "tasit")]
    Vehicle,
}

impl LoanCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanCategory::Personal => "personal",
            LoanCategory::Housing => "housing",
            LoanCategory::Vehicle => "vehicle",
        }
    }
}

impl fmt::Display for LoanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanCategory {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" | "ihtiyac" => Ok(LoanCategory::Personal),
            "housing" | "konut" => Ok(LoanCategory::Housing),
            "vehicle" | "tasit" => Ok(LoanCategory::Vehicle),
            other => Err(LoanCalcError::invalid(
                "loan_category",
                format!("unrecognised loan category '{other}'"),
            )),
        }
    }
}

/// What to do when a caller asks for a category the table cannot resolve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Fail with `InvalidArgument`
    #[default]
    Reject,
    /// Quote the named category's rate instead
    Fallback { category: LoanCategory },
}

/// A single category → nominal annual rate mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTableEntry {
    pub category: LoanCategory,
    pub nominal_annual_rate_percent: RatePercent,
}

/// Anything that can resolve a loan category to its nominal annual rate.
pub trait RateLookup {
    fn rate_for(&self, category: LoanCategory) -> LoanCalcResult<RatePercent>;

    /// Resolve a raw category name as received from a caller.
    fn resolve(&self, name: &str) -> LoanCalcResult<RateTableEntry> {
        let category: LoanCategory = name.parse()?;
        Ok(RateTableEntry {
            category,
            nominal_annual_rate_percent: self.rate_for(category)?,
        })
    }
}

/// Serialized shape of a rate table, as read from configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTableConfig {
    pub rates: Vec<RateTableEntry>,
    #[serde(default)]
    pub unknown_category: UnknownCategoryPolicy,
}

/// Static mapping from loan category to nominal annual interest rate.
///
/// Built once at startup (from defaults or a configuration file) and
/// only read afterwards, so a shared reference is safe across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RateTableConfig", into = "RateTableConfig")]
pub struct RateTable {
    entries: BTreeMap<LoanCategory, RatePercent>,
    unknown_category: UnknownCategoryPolicy,
}

impl RateTable {
    pub fn new(
        entries: impl IntoIterator<Item = RateTableEntry>,
        unknown_category: UnknownCategoryPolicy,
    ) -> LoanCalcResult<Self> {
        let mut map = BTreeMap::new();
        for entry in entries {
            if entry.nominal_annual_rate_percent < Decimal::ZERO {
                return Err(LoanCalcError::Config(format!(
                    "rate for '{}' must not be negative (got {})",
                    entry.category, entry.nominal_annual_rate_percent
                )));
            }
            if map
                .insert(entry.category, entry.nominal_annual_rate_percent)
                .is_some()
            {
                return Err(LoanCalcError::Config(format!(
                    "duplicate rate entry for '{}'",
                    entry.category
                )));
            }
        }

        if let UnknownCategoryPolicy::Fallback { category } = &unknown_category {
            if !map.contains_key(category) {
                return Err(LoanCalcError::Config(format!(
                    "fallback category '{category}' has no rate entry"
                )));
            }
        }

        Ok(RateTable {
            entries: map,
            unknown_category,
        })
    }

    pub fn from_json_str(json: &str) -> LoanCalcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replace the unknown-category policy, keeping the rates.
    pub fn with_policy(self, policy: UnknownCategoryPolicy) -> LoanCalcResult<Self> {
        RateTable::new(self.entries(), policy)
    }

    pub fn policy(&self) -> &UnknownCategoryPolicy {
        &self.unknown_category
    }

    pub fn entries(&self) -> Vec<RateTableEntry> {
        self.entries
            .iter()
            .map(|(category, rate)| RateTableEntry {
                category: *category,
                nominal_annual_rate_percent: *rate,
            })
            .collect()
    }

    /// Resolve a raw category name, applying the unknown-category policy
    /// when the name does not parse or has no entry.
    pub fn rate_for_name(&self, name: &str) -> LoanCalcResult<RateTableEntry> {
        match name.parse::<LoanCategory>() {
            Ok(category) => match self.entries.get(&category) {
                Some(rate) => Ok(RateTableEntry {
                    category,
                    nominal_annual_rate_percent: *rate,
                }),
                None => self.apply_policy(name),
            },
            Err(_) => self.apply_policy(name),
        }
    }

    fn apply_policy(&self, requested: &str) -> LoanCalcResult<RateTableEntry> {
        match &self.unknown_category {
            UnknownCategoryPolicy::Reject => Err(LoanCalcError::invalid(
                "loan_category",
                format!("no rate configured for category '{requested}'"),
            )),
            UnknownCategoryPolicy::Fallback { category } => {
                let rate = self.entries.get(category).copied().ok_or_else(|| {
                    LoanCalcError::Config(format!(
                        "fallback category '{category}' has no rate entry"
                    ))
                })?;
                warn!(
                    requested,
                    fallback = %category,
                    "unknown loan category, using fallback rate"
                );
                Ok(RateTableEntry {
                    category: *category,
                    nominal_annual_rate_percent: rate,
                })
            }
        }
    }
}

impl RateLookup for RateTable {
    fn rate_for(&self, category: LoanCategory) -> LoanCalcResult<RatePercent> {
        match self.entries.get(&category) {
            Some(rate) => Ok(*rate),
            None => self
                .apply_policy(category.as_str())
                .map(|entry| entry.nominal_annual_rate_percent),
        }
    }

    fn resolve(&self, name: &str) -> LoanCalcResult<RateTableEntry> {
        self.rate_for_name(name)
    }
}

impl Default for RateTable {
    /// Published rates: personal 3.79%, housing 2.89%, vehicle 3.29%.
    fn default() -> Self {
        RateTable {
            entries: BTreeMap::from([
                (LoanCategory::Personal, dec!(3.79)),
                (LoanCategory::Housing, dec!(2.89)),
                (LoanCategory::Vehicle, dec!(3.29)),
            ]),
            unknown_category: UnknownCategoryPolicy::Reject,
        }
    }
}

impl TryFrom<RateTableConfig> for RateTable {
    type Error = LoanCalcError;

    fn try_from(config: RateTableConfig) -> Result<Self, Self::Error> {
        RateTable::new(config.rates, config.unknown_category)
    }
}

impl From<RateTable> for RateTableConfig {
    fn from(table: RateTable) -> Self {
        RateTableConfig {
            rates: table.entries(),
            unknown_category: table.unknown_category,
        }
    }
}
