use tracing::{debug, info, warn};

use crate::analysis::Analysis;
use crate::batch::BatchFailure;
use crate::report::Reporter;
use crate::screener::{ScreenResults, ScreenSummary};

/// Writes results as `tracing` events.
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn analysis(&self, analysis: &Analysis) {
        let ticker = analysis.ticker.as_str();
        let Some(latest) = &analysis.latest else {
            info!(ticker, trend = %analysis.trend, "no price history");
            return;
        };

        info!(
            ticker,
            date = %latest.date(),
            price = latest.close(),
            trend = %analysis.trend,
            rsi = ?latest.rsi,
            atr_percent = ?latest.atr_percent,
            "analysis"
        );

        if analysis.signals.is_empty() {
            debug!(ticker, "no signals");
        }
        let groups = [
            ("buy", &analysis.signals.buy),
            ("sell", &analysis.signals.sell),
            ("neutral", &analysis.signals.neutral),
        ];
        for (polarity, signals) in groups {
            for signal in signals {
                info!(ticker, polarity, "signal: {signal}");
            }
        }

        for strategy in &analysis.strategies {
            info!(
                ticker,
                entry = %strategy.entry,
                stop_loss = %strategy.stop_loss,
                take_profit_1 = %strategy.take_profit_1,
                take_profit_2 = ?strategy.take_profit_2.as_ref().map(ToString::to_string),
                position_size = %strategy.position_size,
                risk_reward = %strategy.risk_reward,
                stop_distance_pct = ?strategy.stop_distance_percent(latest.close()),
                "strategy: {} ({})",
                strategy.kind,
                strategy.rationale,
            );
        }
    }

    fn failure(&self, failure: &BatchFailure) {
        warn!(ticker = %failure.ticker, error = ?failure.error, "analysis failed");
    }

    fn screen(&self, results: &ScreenResults, summary: Option<&ScreenSummary>) {
        for rejection in &results.rejected {
            debug!(ticker = %rejection.ticker, reason = %rejection.reason, "rejected");
        }
        for company in &results.passed {
            info!(
                ticker = %company.ticker,
                name = %company.name,
                market_cap = company.market_cap,
                net_margin = company.net_margin(),
                pe_ratio = company.pe_ratio,
                "passed screen"
            );
        }

        let Some(summary) = summary else {
            info!(rejected = results.rejected.len(), "no companies passed the screen");
            return;
        };
        info!(
            count = summary.count,
            rejected = results.rejected.len(),
            mean_market_cap = summary.mean_market_cap,
            median_market_cap = summary.median_market_cap,
            mean_net_margin = summary.mean_net_margin,
            mean_pe_ratio = summary.mean_pe_ratio,
            "screen summary"
        );
        for (sector, count) in &summary.sectors {
            info!(sector = %sector, count, "sector");
        }
        for (industry, count) in &summary.industries {
            debug!(industry = %industry, count, "industry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::{AnalysisConfig, ScreenerConfig};
    use crate::model::fixtures::{rising, series_from_closes};
    use crate::screener::{Fundamentals, screen_all, summarize};

    #[test]
    fn reporting_an_analysis_does_not_panic() {
        let series = series_from_closes(&rising(250, 10.0, 0.1));
        let analysis = analyze(&series, &AnalysisConfig::default()).unwrap();
        assert!(!analysis.strategies.is_empty());
        TerminalReporter.analysis(&analysis);

        let empty = analyze(&series_from_closes(&[]), &AnalysisConfig::default()).unwrap();
        TerminalReporter.analysis(&empty);
    }

    #[test]
    fn reporting_a_screen_does_not_panic() {
        let company = Fundamentals {
            ticker: "SOUN".into(),
            name: "SoundHound AI".into(),
            description: None,
            sector: Some("Technology".into()),
            industry: None,
            market_cap: Some(1e9),
            net_income: Some(5e6),
            revenue: Some(5e7),
            pe_ratio: Some(30.0),
            current_price: None,
        };
        let results = screen_all(vec![company], &ScreenerConfig::default());
        let summary = summarize(&results.passed);
        assert!(summary.is_some());
        TerminalReporter.screen(&results, summary.as_ref());
        TerminalReporter.screen(&ScreenResults::default(), None);
    }
}
