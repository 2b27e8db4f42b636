use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex as TokioMutex;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{KlineDataset, MoneyFlowDataset};
use crate::services::eastmoney::EastmoneyClient;
use crate::utils::{get_concurrency, get_pace_interval};

/// Minimum-interval throttle shared across all fetch tasks in a batch.
///
/// Tasks serialize on the lock and sleep out the remainder of the interval
/// before releasing it, so request starts are spaced at least `min_interval`
/// apart no matter how many workers run concurrently.
pub struct FetchThrottle {
    last_request: TokioMutex<Option<Instant>>,
    min_interval: StdDuration,
}

impl FetchThrottle {
    pub fn new(min_interval: StdDuration) -> Self {
        Self {
            last_request: TokioMutex::new(None),
            min_interval,
        }
    }

    pub async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Drives the per-code fetchers across a list of security codes.
///
/// Per-code fetches run concurrently in a bounded pool; results come back in
/// input-code order, and a failed code is logged and skipped without
/// disturbing its siblings. Both feeds share the same pacing throttle.
pub struct BatchCollector {
    client: EastmoneyClient,
    throttle: Arc<FetchThrottle>,
    concurrency: usize,
}

impl BatchCollector {
    pub fn new(client: EastmoneyClient) -> Self {
        Self::with_pacing(client, get_pace_interval(), get_concurrency())
    }

    pub fn with_pacing(client: EastmoneyClient, pace: StdDuration, concurrency: usize) -> Self {
        Self {
            client,
            throttle: Arc::new(FetchThrottle::new(pace)),
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch K-line history for every code; failed codes are dropped.
    pub async fn fetch_kline_batch(
        &self,
        codes: &[String],
        klt: &str,
        fqt: &str,
        limit: u32,
    ) -> KlineDataset {
        info!(codes = codes.len(), limit = limit, "Fetching kline batch");

        let client = self.client.clone();
        let throttle = Arc::clone(&self.throttle);
        let klt = klt.to_string();
        let fqt = fqt.to_string();

        collect_batch(codes, self.concurrency, move |code| {
            let client = client.clone();
            let throttle = Arc::clone(&throttle);
            let klt = klt.clone();
            let fqt = fqt.clone();
            async move {
                throttle.pace().await;
                client.get_kline(&code, &klt, &fqt, limit).await
            }
        })
        .await
    }

    /// Fetch money-flow history for every code; failed codes are dropped.
    pub async fn fetch_money_flow_batch(&self, codes: &[String], days: u32) -> MoneyFlowDataset {
        info!(codes = codes.len(), days = days, "Fetching money-flow batch");

        let client = self.client.clone();
        let throttle = Arc::clone(&self.throttle);

        collect_batch(codes, self.concurrency, move |code| {
            let client = client.clone();
            let throttle = Arc::clone(&throttle);
            async move {
                throttle.pace().await;
                client.get_money_flow(&code, days).await
            }
        })
        .await
    }
}

/// Run `fetch` for every code with bounded concurrency and concatenate the
/// successful results in input-code order.
///
/// One bad code never aborts the batch: failures are logged and skipped, and
/// zero successes yields an empty dataset.
async fn collect_batch<T, F, Fut>(codes: &[String], concurrency: usize, fetch: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    let mut all = Vec::new();

    for chunk in codes.chunks(concurrency.max(1)) {
        let mut tasks = Vec::new();
        for code in chunk {
            let code = code.clone();
            let fut = fetch(code.clone());
            tasks.push(tokio::spawn(async move { (code, fut.await) }));
        }

        // join_all yields results in task order, which is input-code order.
        for task_result in join_all(tasks).await {
            match task_result {
                Ok((code, Ok(records))) => {
                    info!(code = %code, records = records.len(), "Fetched code");
                    all.extend(records);
                }
                Ok((code, Err(e))) => {
                    warn!(code = %code, error = %e, "Skipping code after fetch failure");
                }
                Err(e) => {
                    warn!(error = %e, "Fetch task join error");
                }
            }
        }
    }

    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_collect_batch_preserves_input_order() {
        let codes = vec!["s1".to_string(), "s2".to_string(), "s3".to_string()];

        let data = collect_batch(&codes, 3, |code| async move {
            // Make the first code finish last; order must not change.
            if code == "s1" {
                sleep(StdDuration::from_millis(30)).await;
            }
            let tag: i32 = code.trim_start_matches('s').parse().unwrap();
            Ok(vec![tag, tag * 10])
        })
        .await;

        assert_eq!(data, vec![1, 10, 2, 20, 3, 30]);
    }

    #[tokio::test]
    async fn test_collect_batch_isolates_failures() {
        let codes = vec!["good".to_string(), "bad".to_string(), "fine".to_string()];

        let data = collect_batch(&codes, 2, |code| async move {
            if code == "bad" {
                Err(AppError::NoData("no data".to_string()))
            } else {
                Ok(vec![code])
            }
        })
        .await;

        assert_eq!(data, vec!["good".to_string(), "fine".to_string()]);
    }

    #[tokio::test]
    async fn test_collect_batch_all_failures_yield_empty_dataset() {
        let codes = vec!["a".to_string(), "b".to_string()];

        let data: Vec<i32> = collect_batch(&codes, 2, |_code| async move {
            Err(AppError::Network("timeout".to_string()))
        })
        .await;

        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_code_without_data_leaves_only_sibling_rows_in_output() {
        use crate::models::{KlineRecord, MoneyFlowRecord};
        use crate::services::reconciler;

        // Code A has no provider data for either feed; code B succeeds on
        // both. The output must contain only B's rows and raise no error.
        let codes = vec!["000001".to_string(), "600519".to_string()];

        let kline = collect_batch(&codes, 2, |code| async move {
            if code == "000001" {
                return Err(AppError::NoData(format!("no kline data for {}", code)));
            }
            let line = "2024-05-10,1700.0,1710.0,1720.0,1690.0,30000,51300000.0,1.8,0.6,10.0,0.4";
            let parts: Vec<&str> = line.split(',').collect();
            Ok(vec![KlineRecord::from_parts(&code, &parts).unwrap()])
        })
        .await;

        let flow = collect_batch(&codes, 2, |code| async move {
            if code == "000001" {
                return Err(AppError::NoData(format!("empty money-flow lines for {}", code)));
            }
            let line =
                "2024-05-10,1000.0,-200.0,300.0,400.0,600.0,5.1,-1.0,1.5,2.0,3.1,1710.0,0.6";
            let parts: Vec<&str> = line.split(',').collect();
            Ok(vec![MoneyFlowRecord::from_parts(&code, Some("贵州茅台"), &parts).unwrap()])
        })
        .await;

        let merged = reconciler::merge(&kline, &flow).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].code, "600519");

        let rows = reconciler::to_rows(&merged);
        assert!(rows.iter().all(|r| r["code"] == "600519"));
    }

    #[tokio::test]
    async fn test_throttle_spaces_request_starts() {
        let throttle = FetchThrottle::new(StdDuration::from_millis(40));

        let start = Instant::now();
        throttle.pace().await;
        throttle.pace().await;
        throttle.pace().await;

        assert!(start.elapsed() >= StdDuration::from_millis(80));
    }
}
