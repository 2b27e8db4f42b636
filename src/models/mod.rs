mod kline;
mod lookback;
mod merged;
mod money_flow;

pub use kline::KlineRecord;
pub use lookback::Lookback;
pub use merged::{FlowValues, KlineValues, MergedRow};
pub use money_flow::MoneyFlowRecord;

/// Per-feed dataset: concatenated successful per-code fetches, in input-code
/// order. Failed codes are simply absent.
pub type KlineDataset = Vec<KlineRecord>;
pub type MoneyFlowDataset = Vec<MoneyFlowRecord>;
