use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::PriceBar;

/// Rate of change: percent change of close versus `period` bars earlier.
pub struct Roc {
    period: usize,
}

impl Roc {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        "roc"
    }

    fn required_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        lagged(&close_prices(bars), self.period, |current, past| {
            (past != 0.0).then(|| (current / past - 1.0) * 100.0)
        })
    }
}

/// Absolute momentum: close minus the close `period` bars earlier.
pub struct Momentum {
    period: usize,
}

impl Momentum {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn required_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        lagged(&close_prices(bars), self.period, |current, past| {
            Some(current - past)
        })
    }
}

fn lagged<F>(values: &[f64], lag: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> Option<f64>,
{
    values
        .iter()
        .enumerate()
        .map(|(i, &current)| i.checked_sub(lag).and_then(|j| f(current, values[j])))
        .collect()
}
