use error_stack::{Report, ResultExt};
use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::indicator::engine::IndicatorEngine;
use crate::model::{IndicatorSnapshot, PriceSeries, TrendLabel};
use crate::signal::{SignalSet, generate_signals};
use crate::strategy::StrategySuggestion;
use crate::strategy::rules::recommend_strategies;
use crate::trend::classify_trend;

/// Outcome of running the full pipeline over one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub ticker: String,
    /// Last enriched row; `None` when the series has no bars.
    pub latest: Option<IndicatorSnapshot>,
    pub trend: TrendLabel,
    pub signals: SignalSet,
    pub strategies: Vec<StrategySuggestion>,
}

impl Analysis {
    fn empty(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            latest: None,
            trend: TrendLabel::Sideways,
            signals: SignalSet::default(),
            strategies: Vec::new(),
        }
    }
}

/// Indicators, trend, signals and strategies for `series`.
pub fn analyze(
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<Analysis, Report<AnalysisError>> {
    let ticker = series.ticker();
    let engine =
        IndicatorEngine::new(&config.indicators).change_context(AnalysisError::Indicators {
            ticker: ticker.to_string(),
        })?;

    let mut snapshots = engine.compute(series);
    let Some(latest) = snapshots.pop() else {
        debug!(ticker, "empty series, nothing to analyze");
        return Ok(Analysis::empty(ticker));
    };
    let previous = snapshots.last();

    let trend = classify_trend(&latest);
    let signals = generate_signals(&latest, previous, &config.signals);
    let strategies = recommend_strategies(trend, &latest, &signals, &config.strategy);

    debug!(
        ticker,
        %trend,
        signals = signals.buy.len() + signals.sell.len() + signals.neutral.len(),
        strategies = strategies.len(),
        "analysis complete"
    );

    Ok(Analysis {
        ticker: ticker.to_string(),
        latest: Some(latest),
        trend,
        signals,
        strategies,
    })
}
