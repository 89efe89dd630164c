use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::model::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub support: f64,
    pub resistance: f64,
}

/// Rolling support (lowest low) and resistance (highest high), current bar
/// included.
pub struct SupportResistance {
    window: usize,
}

impl SupportResistance {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        if window == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be > 0".into(),
            });
        }
        Ok(Self { window })
    }

    pub fn calculate_levels(&self, bars: &[PriceBar]) -> Vec<Option<Levels>> {
        let mut output = vec![None; bars.len()];
        if bars.len() < self.window {
            return output;
        }
        for (i, window) in bars.windows(self.window).enumerate() {
            let support = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let resistance = window
                .iter()
                .map(|b| b.high)
                .fold(f64::NEG_INFINITY, f64::max);
            output[i + self.window - 1] = Some(Levels {
                support,
                resistance,
            });
        }
        output
    }
}
