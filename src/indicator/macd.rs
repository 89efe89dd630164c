use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::Ema;
use crate::indicator::{Indicator, close_prices};
use crate::model::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD built from first-value-seeded EMAs, so every row is defined.
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "all periods must be > 0".into(),
            });
        }
        if fast_period >= slow_period {
            bail!(IndicatorError::InvalidParameter {
                name: "fast_period must be < slow_period".into(),
            });
        }
        Ok(Self {
            fast: Ema::new(fast_period)?,
            slow: Ema::new(slow_period)?,
            signal: Ema::new(signal_period)?,
        })
    }

    /// EMA values of both legs plus the MACD triple for every bar.
    pub fn calculate_full(&self, bars: &[PriceBar]) -> (Vec<f64>, Vec<f64>, Vec<MacdPoint>) {
        let prices = close_prices(bars);
        let fast = self.fast.calculate_values(&prices);
        let slow = self.slow.calculate_values(&prices);

        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = self.signal.calculate_values(&line);

        let points = line
            .iter()
            .zip(&signal)
            .map(|(&line, &signal)| MacdPoint {
                line,
                signal,
                histogram: line - signal,
            })
            .collect();

        (fast, slow, points)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn required_bars(&self) -> usize {
        1
    }

    /// Returns MACD line values only.
    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let (_, _, points) = self.calculate_full(bars);
        points.into_iter().map(|p| Some(p.line)).collect()
    }
}
