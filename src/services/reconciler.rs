//! Outer-join reconciliation of the two daily feeds.
//!
//! Joins the K-line and money-flow datasets on (security code, trading
//! date), resolves the one deliberately colliding column (close price),
//! coerces every numeric column, backfills the security name, and serializes
//! rows in the canonical column order. Row ordering is part of the output
//! contract: codes ascending, dates descending within a code.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::info;

use crate::constants::{FLOW_OWNED_COLUMNS, KLINE_OWNED_COLUMNS, OUTPUT_COLUMNS};
use crate::error::{AppError, Result};
use crate::models::{FlowValues, KlineRecord, KlineValues, MergedRow, MoneyFlowRecord};

/// Lenient numeric coercion: an unparsable or blank value becomes the
/// missing marker, never an error and never a silently wrong number.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    trimmed.parse().ok()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| AppError::Parse(format!("invalid date '{}': {}", raw, e)))
}

#[derive(Default)]
struct JoinSlot {
    name: Option<String>,
    kline: Option<KlineValues>,
    kline_close: Option<f64>,
    flow: Option<FlowValues>,
    flow_close: Option<f64>,
}

/// Full outer join of the two per-feed datasets on (date, code).
///
/// Both datasets must be non-empty: a feed that failed for every code leaves
/// the join without an anchor and the whole invocation fails. Returns rows
/// sorted by code ascending, date descending, with the close price resolved
/// and the security name backfilled onto every row.
pub fn merge(kline: &[KlineRecord], flow: &[MoneyFlowRecord]) -> Result<Vec<MergedRow>> {
    if kline.is_empty() {
        return Err(AppError::EmptyDataset("kline dataset is empty".to_string()));
    }
    if flow.is_empty() {
        return Err(AppError::EmptyDataset("money-flow dataset is empty".to_string()));
    }

    // The key ordering is the presentation contract: BTreeMap iteration
    // gives code ascending, date descending via Reverse.
    let mut joined: BTreeMap<(String, Reverse<NaiveDate>), JoinSlot> = BTreeMap::new();

    for rec in kline {
        let date = parse_date(&rec.date)?;
        let slot = joined
            .entry((rec.code.clone(), Reverse(date)))
            .or_default();
        slot.kline_close = parse_numeric(&rec.close);
        slot.kline = Some(KlineValues {
            open: parse_numeric(&rec.open),
            high: parse_numeric(&rec.high),
            low: parse_numeric(&rec.low),
            volume: parse_numeric(&rec.volume),
            turnover: parse_numeric(&rec.turnover),
            turnover_rate: parse_numeric(&rec.turnover_rate),
            amplitude: parse_numeric(&rec.amplitude),
            pct_chg: parse_numeric(&rec.pct_chg),
            chg_amount: parse_numeric(&rec.chg_amount),
        });
    }

    for rec in flow {
        let date = parse_date(&rec.date)?;
        let slot = joined
            .entry((rec.code.clone(), Reverse(date)))
            .or_default();
        slot.flow_close = parse_numeric(&rec.close);
        if slot.name.is_none() {
            slot.name = rec.name.clone();
        }
        slot.flow = Some(FlowValues {
            main_inflow: parse_numeric(&rec.main_inflow),
            small_inflow: parse_numeric(&rec.small_inflow),
            medium_inflow: parse_numeric(&rec.medium_inflow),
            large_inflow: parse_numeric(&rec.large_inflow),
            extra_large_inflow: parse_numeric(&rec.extra_large_inflow),
            main_inflow_ratio: parse_numeric(&rec.main_inflow_ratio),
            small_inflow_ratio: parse_numeric(&rec.small_inflow_ratio),
            medium_inflow_ratio: parse_numeric(&rec.medium_inflow_ratio),
            large_inflow_ratio: parse_numeric(&rec.large_inflow_ratio),
            extra_large_inflow_ratio: parse_numeric(&rec.extra_large_inflow_ratio),
        });
    }

    let mut rows: Vec<MergedRow> = joined
        .into_iter()
        .map(|((code, Reverse(date)), slot)| MergedRow {
            date,
            code,
            name: slot.name,
            // K-line close wins; the money-flow close fills gaps.
            close: slot.kline_close.or(slot.flow_close),
            kline: slot.kline,
            flow: slot.flow,
        })
        .collect();

    // Backfill: the first non-missing name in output order fills every row.
    // No name anywhere is fatal for the invocation.
    let first_name = rows
        .iter()
        .find_map(|r| r.name.clone())
        .ok_or(AppError::MissingName)?;
    for row in &mut rows {
        if row.name.is_none() {
            row.name = Some(first_name.clone());
        }
    }

    info!(rows = rows.len(), "Reconciled feeds");
    Ok(rows)
}

/// Serialize reconciled rows to the canonical wire format: one
/// insertion-ordered field map per row, columns in canonical order.
///
/// A canonical column whose owning feed contributed no rows at all is
/// dropped from the column set rather than emitted as all-null.
pub fn to_rows(rows: &[MergedRow]) -> Vec<Map<String, Value>> {
    let has_kline = rows.iter().any(|r| r.kline.is_some());
    let has_flow = rows.iter().any(|r| r.flow.is_some());

    let columns: Vec<&str> = OUTPUT_COLUMNS
        .iter()
        .copied()
        .filter(|col| column_present(col, has_kline, has_flow))
        .collect();

    rows.iter()
        .map(|row| {
            let mut map = Map::new();
            for col in &columns {
                map.insert((*col).to_string(), column_value(row, col));
            }
            map
        })
        .collect()
}

/// Serialize reconciled rows to a JSON array string.
pub fn to_json(rows: &[MergedRow]) -> Result<String> {
    serde_json::to_string(&to_rows(rows)).map_err(Into::into)
}

fn column_present(col: &str, has_kline: bool, has_flow: bool) -> bool {
    if KLINE_OWNED_COLUMNS.contains(&col) {
        has_kline
    } else if FLOW_OWNED_COLUMNS.contains(&col) {
        has_flow
    } else if col == "close" {
        has_kline || has_flow
    } else {
        // date, code, name
        true
    }
}

fn column_value(row: &MergedRow, col: &str) -> Value {
    match col {
        "date" => Value::String(row.date.format("%Y-%m-%d").to_string()),
        "code" => Value::String(row.code.clone()),
        "name" => row.name.clone().map(Value::String).unwrap_or(Value::Null),
        _ => numeric_column_value(row, col)
            .map(Value::from)
            .unwrap_or(Value::Null),
    }
}

fn numeric_column_value(row: &MergedRow, col: &str) -> Option<f64> {
    let kline = row.kline.as_ref();
    let flow = row.flow.as_ref();
    match col {
        "close" => row.close,
        "open" => kline.and_then(|k| k.open),
        "high" => kline.and_then(|k| k.high),
        "low" => kline.and_then(|k| k.low),
        "volume" => kline.and_then(|k| k.volume),
        "turnover" => kline.and_then(|k| k.turnover),
        "turnover_rate" => kline.and_then(|k| k.turnover_rate),
        "amplitude" => kline.and_then(|k| k.amplitude),
        "pct_chg" => kline.and_then(|k| k.pct_chg),
        "chg_amount" => kline.and_then(|k| k.chg_amount),
        "main_inflow" => flow.and_then(|f| f.main_inflow),
        "small_inflow" => flow.and_then(|f| f.small_inflow),
        "medium_inflow" => flow.and_then(|f| f.medium_inflow),
        "large_inflow" => flow.and_then(|f| f.large_inflow),
        "extra_large_inflow" => flow.and_then(|f| f.extra_large_inflow),
        "main_inflow_ratio" => flow.and_then(|f| f.main_inflow_ratio),
        "small_inflow_ratio" => flow.and_then(|f| f.small_inflow_ratio),
        "medium_inflow_ratio" => flow.and_then(|f| f.medium_inflow_ratio),
        "large_inflow_ratio" => flow.and_then(|f| f.large_inflow_ratio),
        "extra_large_inflow_ratio" => flow.and_then(|f| f.extra_large_inflow_ratio),
        _ => None,
    }
}
