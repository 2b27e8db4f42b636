use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numeric K-line columns after coercion. The source close price is consumed
/// by close resolution and does not appear here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KlineValues {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
    pub turnover: Option<f64>,
    pub turnover_rate: Option<f64>,
    pub amplitude: Option<f64>,
    pub pct_chg: Option<f64>,
    pub chg_amount: Option<f64>,
}

/// Numeric money-flow columns after coercion. The feed's close price and
/// percent change are consumed during reconciliation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowValues {
    pub main_inflow: Option<f64>,
    pub small_inflow: Option<f64>,
    pub medium_inflow: Option<f64>,
    pub large_inflow: Option<f64>,
    pub extra_large_inflow: Option<f64>,
    pub main_inflow_ratio: Option<f64>,
    pub small_inflow_ratio: Option<f64>,
    pub medium_inflow_ratio: Option<f64>,
    pub large_inflow_ratio: Option<f64>,
    pub extra_large_inflow_ratio: Option<f64>,
}

/// One reconciled row: a single (date, code) with the columns of both feeds.
///
/// A `None` side means that feed had no row for this (date, code) - an outer
/// join non-match. A `None` inside a side means the feed had the row but the
/// value did not parse. Downstream consumers can tell the two apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRow {
    pub date: NaiveDate,
    pub code: String,
    /// Backfilled before the merge returns; never None in reconciler output
    pub name: Option<String>,
    /// Resolved close: K-line value, falling back to the money-flow value
    pub close: Option<f64>,
    pub kline: Option<KlineValues>,
    pub flow: Option<FlowValues>,
}
