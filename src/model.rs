use std::fmt;

use chrono::NaiveDate;
use error_stack::{Report, bail};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// One trading day for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    fn check(&self) -> Result<(), Report<SeriesError>> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            bail!(SeriesError::InvalidBar {
                date: self.date,
                reason: "prices must be finite and positive".into(),
            });
        }
        if self.high < self.open.max(self.close).max(self.low) {
            bail!(SeriesError::InvalidBar {
                date: self.date,
                reason: format!("high {} is below open/close/low", self.high),
            });
        }
        if self.low > self.open.min(self.close) {
            bail!(SeriesError::InvalidBar {
                date: self.date,
                reason: format!("low {} is above open/close", self.low),
            });
        }
        Ok(())
    }
}

/// Daily bars for a single instrument, strictly increasing by date.
///
/// The only way to obtain a `PriceSeries` is through [`PriceSeries::new`], so
/// every downstream stage can rely on chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(
        ticker: impl Into<String>,
        bars: Vec<PriceBar>,
    ) -> Result<Self, Report<SeriesError>> {
        for bar in &bars {
            bar.check()?;
        }
        for pair in bars.windows(2) {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                bail!(SeriesError::DuplicateDate { date: current });
            }
            if current < previous {
                bail!(SeriesError::OutOfOrder {
                    date: current,
                    previous,
                });
            }
        }
        Ok(Self {
            ticker: ticker.into(),
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// A price bar enriched with derived indicator values.
///
/// `None` means "not computable yet": the trailing window for that value is
/// longer than the history available at this row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub bar: PriceBar,
    pub sma_short: Option<f64>,
    pub sma_medium: Option<f64>,
    pub sma_long: Option<f64>,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub rsi: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_width: Option<f64>,
    pub atr: Option<f64>,
    pub atr_percent: Option<f64>,
    pub volume_sma: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub roc: Option<f64>,
    pub momentum: Option<f64>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    StrongUptrend,
    Uptrend,
    StrongDowntrend,
    Downtrend,
    Sideways,
}

impl TrendLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongUptrend => "strong_uptrend",
            Self::Uptrend => "uptrend",
            Self::StrongDowntrend => "strong_downtrend",
            Self::Downtrend => "downtrend",
            Self::Sideways => "sideways",
        }
    }

    /// True for both `uptrend` and `strong_uptrend`.
    pub fn is_uptrend(self) -> bool {
        matches!(self, Self::StrongUptrend | Self::Uptrend)
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Days, NaiveDate};

    use super::{PriceBar, PriceSeries};

    pub fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    /// Bars with open/high/low all equal to close and a constant volume.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: start_date() + Days::new(i as u64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000,
            })
            .collect()
    }

    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        PriceSeries::new("TEST", bars_from_closes(closes)).unwrap()
    }

    pub fn rising(n: usize, start: f64, step: f64) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn empty_series_is_valid() {
        let series = PriceSeries::new("EMPTY", vec![]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.ticker(), "EMPTY");
    }

    #[test]
    fn duplicate_dates_rejected() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        bars[2].date = bars[1].date;
        let err = PriceSeries::new("DUP", bars).unwrap_err();
        assert!(matches!(
            err.current_context(),
            SeriesError::DuplicateDate { .. }
        ));
    }

    #[test]
    fn out_of_order_dates_rejected() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        bars.swap(0, 2);
        let err = PriceSeries::new("ORDER", bars).unwrap_err();
        assert!(matches!(
            err.current_context(),
            SeriesError::OutOfOrder { .. }
        ));
    }

    #[test]
    fn high_below_close_rejected() {
        let mut bars = bars_from_closes(&[10.0]);
        bars[0].high = 9.0;
        assert!(PriceSeries::new("BAD", bars).is_err());
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut bars = bars_from_closes(&[10.0]);
        bars[0].low = 0.0;
        assert!(PriceSeries::new("BAD", bars).is_err());
    }

    #[test]
    fn trend_label_strings() {
        assert_eq!(TrendLabel::StrongUptrend.to_string(), "strong_uptrend");
        assert_eq!(TrendLabel::Sideways.as_str(), "sideways");
        assert!(TrendLabel::Uptrend.is_uptrend());
        assert!(TrendLabel::StrongUptrend.is_uptrend());
        assert!(!TrendLabel::StrongDowntrend.is_uptrend());
    }

    #[test]
    fn price_bar_serde_round_trip() {
        let bar = bars_from_closes(&[12.5])[0];
        let json = serde_json::to_string(&bar).unwrap();
        assert!(json.contains("\"2024-01-02\""));
        let parsed: PriceBar = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, bar);
    }
}
