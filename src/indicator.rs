pub mod atr;
pub mod bollinger;
pub mod engine;
pub mod levels;
pub mod ma;
pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod volume;

use crate::model::PriceBar;

/// A technical analysis indicator that operates on a slice of bars.
///
/// Bars must be in ascending chronological order (oldest first).
pub trait Indicator: Send + Sync {
    /// Unique name of this indicator (e.g., "rsi", "sma").
    #[allow(dead_code)]
    fn name(&self) -> &str;

    /// Number of bars needed before the first defined value.
    fn required_bars(&self) -> usize;

    /// Calculate one value per input bar.
    ///
    /// Rows without enough trailing history are `None`, so the output always
    /// has the same length as `bars`.
    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>>;
}

/// Extract close prices from a slice of bars.
pub fn close_prices(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Extract volumes from a slice of bars.
pub fn volumes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume as f64).collect()
}

/// Apply `f` to every trailing window of `window` values.
///
/// The first `window - 1` rows are `None`.
pub fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut output = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return output;
    }
    for (i, w) in values.windows(window).enumerate() {
        output[i + window - 1] = Some(f(w));
    }
    output
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_pads_warmup_with_none() {
        let out = rolling(&[1.0, 2.0, 3.0, 4.0], 3, mean);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn rolling_window_longer_than_input() {
        let out = rolling(&[1.0, 2.0], 5, mean);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn rolling_empty_input() {
        assert!(rolling(&[], 3, mean).is_empty());
    }
}
