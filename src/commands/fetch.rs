use tracing::info;

use crate::constants::{FQT_FORWARD_ADJUSTED, KLT_DAILY};
use crate::error::Result;
use crate::models::Lookback;
use crate::services::{reconciler, BatchCollector, EastmoneyClient};

pub async fn run(codes_arg: String, lookback_arg: String) {
    let codes: Vec<String> = codes_arg
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if codes.is_empty() {
        eprintln!("❌ No security codes given");
        std::process::exit(1);
    }

    let lookback: Lookback = match lookback_arg.parse() {
        Ok(lookback) => lookback,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match run_pipeline(&codes, lookback).await {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Fetch failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Full pipeline for one invocation: fetch both per-feed batches, reconcile,
/// serialize. Per-code failures are absorbed by the collector; an entirely
/// empty feed surfaces here as a reconciliation error.
pub async fn run_pipeline(codes: &[String], lookback: Lookback) -> Result<String> {
    info!(codes = codes.len(), days = lookback.days(), "Starting pipeline");

    let client = EastmoneyClient::new(true)?;
    let collector = BatchCollector::new(client);

    let kline = collector
        .fetch_kline_batch(codes, KLT_DAILY, FQT_FORWARD_ADJUSTED, lookback.days())
        .await;
    let flow = collector
        .fetch_money_flow_batch(codes, lookback.days())
        .await;

    let merged = reconciler::merge(&kline, &flow)?;
    reconciler::to_json(&merged)
}
