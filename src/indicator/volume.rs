use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, mean, rolling, volumes};
use crate::model::PriceBar;

/// Volume Moving Average — simple average of trading volume over a period.
pub struct VolumeMA {
    period: usize,
}

impl VolumeMA {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Current volume divided by the volume MA, per bar.
    ///
    /// Undefined during warm-up and when the average volume is zero.
    pub fn ratios(&self, bars: &[PriceBar], averages: &[Option<f64>]) -> Vec<Option<f64>> {
        bars.iter()
            .zip(averages)
            .map(|(bar, avg)| match avg {
                Some(avg) if *avg > 0.0 => Some(bar.volume as f64 / avg),
                _ => None,
            })
            .collect()
    }
}

impl Indicator for VolumeMA {
    fn name(&self) -> &str {
        "volume_ma"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    /// Returns volume MA values.
    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        rolling(&volumes(bars), self.period, mean)
    }
}
