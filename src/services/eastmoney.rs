use isahc::{config::Configurable, prelude::*, HttpClient};
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use crate::constants::{
    DATA_REFERER, KLINE_END_SENTINEL, KLINE_FIELDS, KLINE_META_FIELDS, KLINE_TOKEN, KLINE_URL,
    MONEY_FLOW_FIELDS, MONEY_FLOW_FIELD_CODES, MONEY_FLOW_META_FIELDS, MONEY_FLOW_TOKEN,
    MONEY_FLOW_URL, QUOTE_REFERER, REQUEST_TIMEOUT_SECS,
};
use crate::error::{AppError, Result};
use crate::models::{KlineRecord, MoneyFlowRecord};

/// Eastmoney quote API client for the two daily feeds.
///
/// Every call goes out with a bounded timeout and, when `random_agent` is
/// set, a user agent picked per request from a rotation list - the provider
/// throttles repeated identical clients.
#[derive(Clone)]
pub struct EastmoneyClient {
    client: HttpClient,
    user_agents: Vec<String>,
    random_agent: bool,
}

/// Derive the composite market-prefixed identifier the provider expects.
/// Codes starting with '6' or '5' trade on Shanghai, everything else on
/// Shenzhen.
pub fn secid_for(code: &str) -> String {
    let market = if code.starts_with('6') || code.starts_with('5') {
        "1"
    } else {
        "0"
    };
    format!("{}.{}", market, code)
}

impl EastmoneyClient {
    pub fn new(random_agent: bool) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0".to_string(),
        ];

        Ok(Self {
            client,
            user_agents,
            random_agent,
        })
    }

    fn get_user_agent(&self) -> String {
        if self.random_agent {
            use rand::seq::SliceRandom;
            self.user_agents
                .choose(&mut rand::thread_rng())
                .unwrap_or(&self.user_agents[0])
                .clone()
        } else {
            self.user_agents[0].clone()
        }
    }

    async fn get_json(&self, url: &str, referer: &str) -> Result<Value> {
        let user_agent = self.get_user_agent();

        debug!(url = url, "Eastmoney request");

        let request = isahc::Request::builder()
            .uri(url)
            .method("GET")
            .header("User-Agent", user_agent.as_str())
            .header("Referer", referer)
            .header("Accept-Language", "zh-CN,zh;q=0.9")
            .body(())
            .map_err(|e| AppError::Network(format!("Request build error: {}", e)))?;

        let mut response = self.client.send_async(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "HTTP error ({}) - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Response body error: {}", e)))?;

        let value = serde_json::from_str::<Value>(&text)?;
        Ok(value)
    }

    /// Fetch daily K-line history for one bare security code.
    ///
    /// `klt` selects the candle interval, `fqt` the price adjustment, `limit`
    /// the number of most recent days.
    pub async fn get_kline(
        &self,
        code: &str,
        klt: &str,
        fqt: &str,
        limit: u32,
    ) -> Result<Vec<KlineRecord>> {
        let secid = secid_for(code);
        let field_codes: Vec<&str> = KLINE_FIELDS.iter().map(|(fc, _)| *fc).collect();

        let url = format!(
            "{}?secid={}&ut={}&fields1={}&fields2={}&klt={}&fqt={}&end={}&lmt={}",
            KLINE_URL,
            secid,
            KLINE_TOKEN,
            KLINE_META_FIELDS,
            field_codes.join(","),
            klt,
            fqt,
            KLINE_END_SENTINEL,
            limit
        );

        let payload = self.get_json(&url, QUOTE_REFERER).await?;
        decode_kline_payload(code, &payload)
    }

    /// Fetch daily money-flow statistics for one bare security code.
    pub async fn get_money_flow(&self, code: &str, days: u32) -> Result<Vec<MoneyFlowRecord>> {
        let secid = secid_for(code);

        let url = format!(
            "{}?secid={}&fields1={}&fields2={}&klt=101&lmt={}&ut={}",
            MONEY_FLOW_URL, secid, MONEY_FLOW_META_FIELDS, MONEY_FLOW_FIELD_CODES, days,
            MONEY_FLOW_TOKEN
        );

        let payload = self.get_json(&url, DATA_REFERER).await?;
        decode_money_flow_payload(code, &payload)
    }
}

/// Decode a K-line response payload into records tagged with `code`.
///
/// A missing `data` payload means "no data for this code". A line whose
/// field count diverges from the registry fails the whole call.
pub fn decode_kline_payload(code: &str, payload: &Value) -> Result<Vec<KlineRecord>> {
    let data = payload
        .get("data")
        .filter(|d| !d.is_null())
        .ok_or_else(|| AppError::NoData(format!("no kline data for {}", secid_for(code))))?;

    let klines = data
        .get("klines")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::NoData(format!("no kline lines for {}", secid_for(code))))?;

    let mut records = Vec::with_capacity(klines.len());
    for line in klines {
        let line = line
            .as_str()
            .ok_or_else(|| AppError::Parse(format!("non-string kline line for {}", code)))?;
        let parts: Vec<&str> = line.split(',').collect();
        records.push(KlineRecord::from_parts(code, &parts)?);
    }

    debug!(code = code, records = records.len(), "Decoded kline response");
    Ok(records)
}

/// Decode a money-flow response payload into records tagged with `code`.
///
/// Requires the provider success code (rc == 0) and a non-empty line set.
/// A line with the wrong column count is skipped, not fatal.
pub fn decode_money_flow_payload(code: &str, payload: &Value) -> Result<Vec<MoneyFlowRecord>> {
    if payload.get("rc").and_then(Value::as_i64) != Some(0) {
        return Err(AppError::NoData(format!("provider error code for {}", code)));
    }

    let data = payload
        .get("data")
        .filter(|d| !d.is_null())
        .ok_or_else(|| AppError::NoData(format!("no money-flow data for {}", code)))?;

    let klines = data
        .get("klines")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::NoData(format!("no money-flow lines for {}", code)))?;

    if klines.is_empty() {
        return Err(AppError::NoData(format!("empty money-flow lines for {}", code)));
    }

    let name = data.get("name").and_then(Value::as_str);

    let mut records = Vec::with_capacity(klines.len());
    for line in klines {
        let line = line
            .as_str()
            .ok_or_else(|| AppError::Parse(format!("non-string money-flow line for {}", code)))?;
        let parts: Vec<&str> = line.split(',').collect();

        if parts.len() != MONEY_FLOW_FIELDS.len() {
            warn!(
                code = code,
                expected = MONEY_FLOW_FIELDS.len(),
                actual = parts.len(),
                "Skipping money-flow line with column-count mismatch"
            );
            continue;
        }

        records.push(MoneyFlowRecord::from_parts(code, name, &parts)?);
    }

    debug!(code = code, records = records.len(), "Decoded money-flow response");
    Ok(records)
}
