use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{Analysis, analyze};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::source::PriceSource;

/// A ticker whose load or analysis failed.
#[derive(Debug)]
pub struct BatchFailure {
    pub ticker: String,
    pub error: Report<AnalysisError>,
}

pub struct BatchReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    /// Sorted by ticker.
    pub analyses: Vec<Analysis>,
    pub failures: Vec<BatchFailure>,
    /// Tickers never started because the run was cancelled.
    pub skipped: Vec<String>,
}

enum Outcome {
    Done(Analysis),
    Failed(BatchFailure),
    Skipped(String),
}

/// Analyze `tickers` with at most `max_workers` in flight.
///
/// A failing ticker is recorded and the batch moves on. Once `cancel` fires,
/// tickers that have not started are skipped; work already in flight is
/// allowed to finish.
pub async fn run(
    source: &dyn PriceSource,
    tickers: &[String],
    config: &AnalysisConfig,
    max_workers: usize,
    cancel: &CancellationToken,
) -> BatchReport {
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!(
        run_id = %run_id,
        tickers = tickers.len(),
        workers = max_workers,
        "batch started"
    );

    let outcomes: Vec<Outcome> = futures::stream::iter(tickers)
        .map(|ticker| process_ticker(source, ticker, config, cancel))
        .buffer_unordered(max_workers.max(1))
        .collect()
        .await;

    let mut report = BatchReport {
        run_id,
        started_at,
        analyses: Vec::new(),
        failures: Vec::new(),
        skipped: Vec::new(),
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Done(analysis) => report.analyses.push(analysis),
            Outcome::Failed(failure) => report.failures.push(failure),
            Outcome::Skipped(ticker) => report.skipped.push(ticker),
        }
    }
    report.analyses.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    report.failures.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    report.skipped.sort();

    info!(
        run_id = %report.run_id,
        analyzed = report.analyses.len(),
        failed = report.failures.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    report
}

async fn process_ticker(
    source: &dyn PriceSource,
    ticker: &str,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Outcome {
    if cancel.is_cancelled() {
        return Outcome::Skipped(ticker.to_string());
    }
    match analyze_ticker(source, ticker, config).await {
        Ok(analysis) => Outcome::Done(analysis),
        Err(error) => {
            warn!(ticker, error = ?error, "analysis failed (continuing)");
            Outcome::Failed(BatchFailure {
                ticker: ticker.to_string(),
                error,
            })
        }
    }
}

async fn analyze_ticker(
    source: &dyn PriceSource,
    ticker: &str,
    config: &AnalysisConfig,
) -> Result<Analysis, Report<AnalysisError>> {
    let series = source
        .load(ticker)
        .await
        .change_context(AnalysisError::Load {
            ticker: ticker.to_string(),
        })?;

    // Indicator work is CPU-bound; keep it off the async workers.
    let config = config.clone();
    tokio::task::spawn_blocking(move || analyze(&series, &config))
        .await
        .change_context(AnalysisError::Worker {
            ticker: ticker.to_string(),
        })?
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;
    use futures::future::BoxFuture;

    use super::*;
    use crate::error::SourceError;
    use crate::model::fixtures::{bars_from_closes, rising};
    use crate::model::{PriceSeries, TrendLabel};

    #[derive(Default)]
    struct MemorySource {
        series: HashMap<String, PriceSeries>,
        loads: AtomicUsize,
    }

    impl MemorySource {
        fn with(mut self, ticker: &str, closes: &[f64]) -> Self {
            let series = PriceSeries::new(ticker, bars_from_closes(closes)).unwrap();
            self.series.insert(ticker.to_string(), series);
            self
        }
    }

    impl PriceSource for MemorySource {
        fn load<'a>(
            &'a self,
            ticker: &'a str,
        ) -> BoxFuture<'a, Result<PriceSeries, Report<SourceError>>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let result = match self.series.get(ticker) {
                Some(series) => Ok(series.clone()),
                None => Err(Report::new(SourceError::NotFound {
                    ticker: ticker.to_string(),
                })),
            };
            futures::future::ready(result).boxed()
        }
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn analyses_sorted_and_failures_collected() {
        let source = MemorySource::default()
            .with("ZZZ", &rising(250, 10.0, 0.1))
            .with("AAA", &[5.0; 30]);
        let report = run(
            &source,
            &tickers(&["ZZZ", "MISSING", "AAA"]),
            &AnalysisConfig::default(),
            2,
            &CancellationToken::new(),
        )
        .await;

        let names: Vec<&str> = report.analyses.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(names, vec!["AAA", "ZZZ"]);
        assert_eq!(report.analyses[1].trend, TrendLabel::StrongUptrend);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticker, "MISSING");
        assert!(matches!(
            report.failures[0].error.current_context(),
            AnalysisError::Load { .. }
        ));
        assert!(report.skipped.is_empty());
        assert!(!report.run_id.is_empty());
    }

    #[tokio::test]
    async fn cancelled_run_skips_everything() {
        let source = MemorySource::default().with("AAA", &[5.0; 10]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = run(
            &source,
            &tickers(&["AAA", "BBB"]),
            &AnalysisConfig::default(),
            4,
            &cancel,
        )
        .await;

        assert!(report.analyses.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(report.skipped, tickers(&["AAA", "BBB"]));
        assert_eq!(source.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_ticker_list() {
        let source = MemorySource::default();
        let report = run(
            &source,
            &[],
            &AnalysisConfig::default(),
            1,
            &CancellationToken::new(),
        )
        .await;
        assert!(report.analyses.is_empty());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn each_run_has_its_own_id() {
        let source = MemorySource::default();
        let cancel = CancellationToken::new();
        let config = AnalysisConfig::default();
        let first = run(&source, &[], &config, 1, &cancel).await;
        let second = run(&source, &[], &config, 1, &cancel).await;
        assert_ne!(first.run_id, second.run_id);
    }
}
