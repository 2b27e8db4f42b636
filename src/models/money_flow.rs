use serde::{Deserialize, Serialize};

use crate::constants::MONEY_FLOW_FIELDS;
use crate::error::{AppError, Result};

/// One decoded money-flow day for a single security.
///
/// Net-inflow amounts are in yuan, ratios in percent, both kept as provider
/// strings until reconciliation. The display name rides along when the
/// provider response carries one; the K-line feed never does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyFlowRecord {
    /// Bare security code (no market prefix)
    pub code: String,
    /// Security display name, when the provider sent a non-blank one
    pub name: Option<String>,
    /// Trading date as returned by the provider (YYYY-MM-DD)
    pub date: String,
    pub main_inflow: String,
    pub small_inflow: String,
    pub medium_inflow: String,
    pub large_inflow: String,
    pub extra_large_inflow: String,
    pub main_inflow_ratio: String,
    pub small_inflow_ratio: String,
    pub medium_inflow_ratio: String,
    pub large_inflow_ratio: String,
    pub extra_large_inflow_ratio: String,
    pub close: String,
    pub flow_pct_chg: String,
}

impl MoneyFlowRecord {
    /// Build a record from one split provider line, validating the field
    /// count against the positional registry.
    pub fn from_parts(code: &str, name: Option<&str>, parts: &[&str]) -> Result<Self> {
        if parts.len() != MONEY_FLOW_FIELDS.len() {
            return Err(AppError::Parse(format!(
                "money-flow line for {} has {} fields, expected {}",
                code,
                parts.len(),
                MONEY_FLOW_FIELDS.len()
            )));
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self {
            code: code.to_string(),
            name,
            date: parts[0].to_string(),
            main_inflow: parts[1].to_string(),
            small_inflow: parts[2].to_string(),
            medium_inflow: parts[3].to_string(),
            large_inflow: parts[4].to_string(),
            extra_large_inflow: parts[5].to_string(),
            main_inflow_ratio: parts[6].to_string(),
            small_inflow_ratio: parts[7].to_string(),
            medium_inflow_ratio: parts[8].to_string(),
            large_inflow_ratio: parts[9].to_string(),
            extra_large_inflow_ratio: parts[10].to_string(),
            close: parts[11].to_string(),
            flow_pct_chg: parts[12].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str =
        "2024-05-10,1000.0,-200.0,300.0,400.0,600.0,5.1,-1.0,1.5,2.0,3.1,10.5,1.9";

    #[test]
    fn test_from_parts() {
        let parts: Vec<&str> = LINE.split(',').collect();
        let record = MoneyFlowRecord::from_parts("001317", Some("德迈仕"), &parts).unwrap();
        assert_eq!(record.name.as_deref(), Some("德迈仕"));
        assert_eq!(record.main_inflow, "1000.0");
        assert_eq!(record.close, "10.5");
        assert_eq!(record.flow_pct_chg, "1.9");
    }

    #[test]
    fn test_blank_name_becomes_none() {
        let parts: Vec<&str> = LINE.split(',').collect();
        let record = MoneyFlowRecord::from_parts("001317", Some("  "), &parts).unwrap();
        assert!(record.name.is_none());
    }

    #[test]
    fn test_from_parts_rejects_column_mismatch() {
        let parts: Vec<&str> = "2024-05-10,1000.0".split(',').collect();
        let err = MoneyFlowRecord::from_parts("001317", None, &parts).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}
