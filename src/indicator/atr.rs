use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, mean, rolling};
use crate::model::PriceBar;

/// Average True Range: trailing simple mean of the true range.
pub struct Atr {
    period: usize,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }
}

/// Per-bar true range. The first bar has no previous close, so its range is
/// `high - low`.
pub fn true_range(bars: &[PriceBar]) -> Vec<f64> {
    let mut previous_close: Option<f64> = None;
    bars.iter()
        .map(|bar| {
            let range = bar.high - bar.low;
            let tr = match previous_close {
                Some(prev) => range
                    .max((bar.high - prev).abs())
                    .max((bar.low - prev).abs()),
                None => range,
            };
            previous_close = Some(bar.close);
            tr
        })
        .collect()
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        "atr"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        rolling(&true_range(bars), self.period, mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::bars_from_closes;

    #[test]
    fn atr_period_zero_invalid() {
        assert!(Atr::new(0).is_err());
    }

    #[test]
    fn true_range_uses_gap_from_previous_close() {
        let mut bars = bars_from_closes(&[10.0, 10.0]);
        bars[0].high = 11.0;
        bars[0].low = 9.0;
        // gap up: low 12 > previous close 10
        bars[1].open = 13.0;
        bars[1].high = 14.0;
        bars[1].low = 12.0;
        bars[1].close = 13.0;
        let tr = true_range(&bars);
        assert!((tr[0] - 2.0).abs() < 1e-9);
        assert!((tr[1] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn atr_flat_prices_is_zero() {
        let atr = Atr::new(3).unwrap();
        let values = atr.calculate(&bars_from_closes(&[5.0; 4]));
        assert_eq!(values[..2], [None, None]);
        assert_eq!(values[2], Some(0.0));
        assert_eq!(values[3], Some(0.0));
    }

    #[test]
    fn atr_known_value() {
        let atr = Atr::new(2).unwrap();
        // closes step by 1, so each true range after the first is 1
        let values = atr.calculate(&bars_from_closes(&[1.0, 2.0, 3.0]));
        assert!((values[1].unwrap() - 0.5).abs() < 1e-9);
        assert!((values[2].unwrap() - 1.0).abs() < 1e-9);
    }
}
