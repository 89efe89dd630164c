use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices, mean};
use crate::model::PriceBar;

/// RSI (Relative Strength Index) from trailing simple averages of gains and
/// losses.
///
/// The first defined row is `period`, once `period` full close-to-close
/// deltas exist.
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    pub fn calculate_values(&self, prices: &[f64]) -> Vec<Option<f64>> {
        let mut output = vec![None; prices.len()];
        let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        if deltas.len() < self.period {
            return output;
        }

        let gains: Vec<f64> = deltas.iter().map(|&d| d.max(0.0)).collect();
        let losses: Vec<f64> = deltas.iter().map(|&d| (-d).max(0.0)).collect();

        for (i, (g, l)) in gains
            .windows(self.period)
            .zip(losses.windows(self.period))
            .enumerate()
        {
            // delta window i ends at delta i + period - 1, i.e. price row i + period
            output[i + self.period] = Some(rsi_value(mean(g), mean(l)));
        }
        output
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        self.calculate_values(&close_prices(bars))
    }
}

/// Zero average loss means RS diverges; that boundary is RSI = 100.
pub fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
