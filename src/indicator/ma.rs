use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices, mean, rolling};
use crate::model::PriceBar;

/// Simple Moving Average.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Calculate SMA values from a price slice (internal helper).
    pub fn calculate_values(&self, values: &[f64]) -> Vec<Option<f64>> {
        rolling(values, self.period, mean)
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        "sma"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        self.calculate_values(&close_prices(bars))
    }
}

/// Exponential Moving Average with `k = 2 / (span + 1)`.
///
/// Seeded with the first value, so it is defined from the first row onward.
/// Early values lean towards the seed.
pub struct Ema {
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Result<Self, Report<IndicatorError>> {
        if span == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "span must be > 0".into(),
            });
        }
        Ok(Self { span })
    }

    /// Calculate EMA values from a price slice (internal helper).
    pub fn calculate_values(&self, values: &[f64]) -> Vec<f64> {
        let k = 2.0 / (self.span as f64 + 1.0);
        let mut results = Vec::with_capacity(values.len());
        let mut iter = values.iter();
        let Some(&seed) = iter.next() else {
            return results;
        };

        let mut ema = seed;
        results.push(ema);
        for &value in iter {
            ema = value * k + ema * (1.0 - k);
            results.push(ema);
        }
        results
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        "ema"
    }

    fn required_bars(&self) -> usize {
        1
    }

    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        self.calculate_values(&close_prices(bars))
            .into_iter()
            .map(Some)
            .collect()
    }
}
