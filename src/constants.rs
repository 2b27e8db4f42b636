//! Field-Map Registry and Provider Constants
//!
//! The Eastmoney quote API returns each trading day as one comma-delimited
//! line whose fields are positional: the order of the requested field codes
//! determines the order of the values in every line. The registries below are
//! the single source of truth for that positional contract - the fetchers
//! request exactly these field codes and the decoders split each line into
//! exactly this many values.
//!
//! Extending a feed with a new provider field means adding one pair here;
//! fetch and decode logic never hard-codes field positions.

/// K-line (daily candlestick) feed: ordered (provider field code, canonical
/// column name) pairs, consumed by position.
pub const KLINE_FIELDS: &[(&str, &str)] = &[
    ("f51", "date"),
    ("f52", "open"),
    ("f53", "close"),
    ("f54", "high"),
    ("f55", "low"),
    ("f56", "volume"),
    ("f57", "turnover"),
    ("f58", "amplitude"),
    ("f59", "pct_chg"),
    ("f60", "chg_amount"),
    ("f61", "turnover_rate"),
];

/// Money-flow (daily capital flow) feed: ordered (position, canonical column
/// name) pairs. Net-inflow amounts come first by order-size tier, then the
/// matching ratios, then the feed's own close price and percent change.
///
/// The feed's close collides with the K-line close by design and is consumed
/// during reconciliation; its percent change is decoded but not part of the
/// canonical output.
pub const MONEY_FLOW_FIELDS: &[(usize, &str)] = &[
    (0, "date"),
    (1, "main_inflow"),
    (2, "small_inflow"),
    (3, "medium_inflow"),
    (4, "large_inflow"),
    (5, "extra_large_inflow"),
    (6, "main_inflow_ratio"),
    (7, "small_inflow_ratio"),
    (8, "medium_inflow_ratio"),
    (9, "large_inflow_ratio"),
    (10, "extra_large_inflow_ratio"),
    (11, "close"),
    (12, "flow_pct_chg"),
];

/// Canonical output column order for reconciled rows.
pub const OUTPUT_COLUMNS: &[&str] = &[
    "date",
    "code",
    "name",
    "open",
    "close",
    "high",
    "low",
    "volume",
    "turnover",
    "turnover_rate",
    "amplitude",
    "pct_chg",
    "chg_amount",
    "main_inflow",
    "small_inflow",
    "medium_inflow",
    "large_inflow",
    "extra_large_inflow",
    "main_inflow_ratio",
    "small_inflow_ratio",
    "medium_inflow_ratio",
    "large_inflow_ratio",
    "extra_large_inflow_ratio",
];

/// Output columns that must be coerced to numeric (everything except
/// date/code/name).
pub const NUMERIC_COLUMNS: &[&str] = &[
    "open",
    "close",
    "high",
    "low",
    "volume",
    "turnover",
    "turnover_rate",
    "amplitude",
    "pct_chg",
    "chg_amount",
    "main_inflow",
    "small_inflow",
    "medium_inflow",
    "large_inflow",
    "extra_large_inflow",
    "main_inflow_ratio",
    "small_inflow_ratio",
    "medium_inflow_ratio",
    "large_inflow_ratio",
    "extra_large_inflow_ratio",
];

/// Output columns sourced from the K-line feed only.
pub const KLINE_OWNED_COLUMNS: &[&str] = &[
    "open",
    "high",
    "low",
    "volume",
    "turnover",
    "turnover_rate",
    "amplitude",
    "pct_chg",
    "chg_amount",
];

/// Output columns sourced from the money-flow feed only.
pub const FLOW_OWNED_COLUMNS: &[&str] = &[
    "main_inflow",
    "small_inflow",
    "medium_inflow",
    "large_inflow",
    "extra_large_inflow",
    "main_inflow_ratio",
    "small_inflow_ratio",
    "medium_inflow_ratio",
    "large_inflow_ratio",
    "extra_large_inflow_ratio",
];

/// K-line history endpoint.
pub const KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

/// Daily money-flow endpoint.
pub const MONEY_FLOW_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/fflow/daykline/get";

/// Provider access token for the K-line endpoint.
pub const KLINE_TOKEN: &str = "fa5fd1943c7b386f172d6893dbfba10b";

/// Provider access token for the money-flow endpoint.
pub const MONEY_FLOW_TOKEN: &str = "b2884a393a59ad64002292a3e90d46a5";

/// Response-envelope field list for the K-line endpoint (fields1).
pub const KLINE_META_FIELDS: &str = "f1,f2,f3,f4,f5,f6";

/// Response-envelope field list for the money-flow endpoint (fields1).
pub const MONEY_FLOW_META_FIELDS: &str = "f1,f2,f3,f7";

/// Requested field codes for the money-flow endpoint (fields2). The response
/// lines are decoded positionally via MONEY_FLOW_FIELDS, so the two lists
/// must stay the same length.
pub const MONEY_FLOW_FIELD_CODES: &str = "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61,f62,f63";

/// Far-future end date sentinel; the K-line endpoint returns the most recent
/// `lmt` days before this date.
pub const KLINE_END_SENTINEL: &str = "20500101";

/// Referer header for the K-line endpoint.
pub const QUOTE_REFERER: &str = "https://quote.eastmoney.com/";

/// Referer header for the money-flow endpoint.
pub const DATA_REFERER: &str = "https://data.eastmoney.com/";

/// Daily candles (klt parameter).
pub const KLT_DAILY: &str = "101";

/// Forward-adjusted prices (fqt parameter).
pub const FQT_FORWARD_ADJUSTED: &str = "1";

/// Per-request timeout in seconds for both provider endpoints.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default minimum interval between provider requests, in milliseconds.
/// Override with DONGFENG_PACE_MS.
pub const DEFAULT_PACE_MS: u64 = 500;

/// Default number of concurrent per-code fetches in a batch.
/// Override with DONGFENG_CONCURRENCY.
pub const DEFAULT_CONCURRENT_FETCHES: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_field_counts() {
        assert_eq!(KLINE_FIELDS.len(), 11);
        assert_eq!(MONEY_FLOW_FIELDS.len(), 13);
        assert_eq!(
            MONEY_FLOW_FIELD_CODES.split(',').count(),
            MONEY_FLOW_FIELDS.len()
        );
    }

    #[test]
    fn test_money_flow_positions_are_contiguous() {
        for (expected, (position, _)) in MONEY_FLOW_FIELDS.iter().enumerate() {
            assert_eq!(*position, expected);
        }
    }

    #[test]
    fn test_output_columns_start_with_identity_fields() {
        assert_eq!(&OUTPUT_COLUMNS[..3], &["date", "code", "name"]);
    }

    #[test]
    fn test_numeric_columns_cover_all_value_columns() {
        assert_eq!(NUMERIC_COLUMNS.len(), OUTPUT_COLUMNS.len() - 3);
        for col in NUMERIC_COLUMNS {
            assert!(OUTPUT_COLUMNS.contains(col));
        }
    }

    #[test]
    fn test_owned_columns_partition_the_numeric_set() {
        // Every numeric column except the resolved close belongs to exactly
        // one feed.
        for col in NUMERIC_COLUMNS {
            if *col == "close" {
                continue;
            }
            let in_kline = KLINE_OWNED_COLUMNS.contains(col);
            let in_flow = FLOW_OWNED_COLUMNS.contains(col);
            assert!(in_kline != in_flow, "column {} must have one owner", col);
        }
    }
}
