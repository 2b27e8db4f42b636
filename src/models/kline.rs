use serde::{Deserialize, Serialize};

use crate::constants::KLINE_FIELDS;
use crate::error::{AppError, Result};

/// One decoded K-line day for a single security, exactly as the provider
/// returned it.
///
/// Values stay provider strings here; numeric coercion happens during
/// reconciliation so an unparsable value degrades to a missing marker instead
/// of failing the fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KlineRecord {
    /// Bare security code (no market prefix)
    pub code: String,
    /// Trading date as returned by the provider (YYYY-MM-DD)
    pub date: String,
    pub open: String,
    pub close: String,
    pub high: String,
    pub low: String,
    pub volume: String,
    pub turnover: String,
    pub amplitude: String,
    pub pct_chg: String,
    pub chg_amount: String,
    pub turnover_rate: String,
}

impl KlineRecord {
    /// Build a record from one split provider line, validating the field
    /// count against the registry.
    pub fn from_parts(code: &str, parts: &[&str]) -> Result<Self> {
        if parts.len() != KLINE_FIELDS.len() {
            return Err(AppError::Parse(format!(
                "kline line for {} has {} fields, expected {}",
                code,
                parts.len(),
                KLINE_FIELDS.len()
            )));
        }

        Ok(Self {
            code: code.to_string(),
            date: parts[0].to_string(),
            open: parts[1].to_string(),
            close: parts[2].to_string(),
            high: parts[3].to_string(),
            low: parts[4].to_string(),
            volume: parts[5].to_string(),
            turnover: parts[6].to_string(),
            amplitude: parts[7].to_string(),
            pct_chg: parts[8].to_string(),
            chg_amount: parts[9].to_string(),
            turnover_rate: parts[10].to_string(),
        })
    }
}
