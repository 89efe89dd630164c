use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::Sma;
use crate::indicator::{Indicator, close_prices};
use crate::model::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl Bands {
    /// `(upper - lower) / middle`, undefined for a zero middle band.
    pub fn width(&self) -> Option<f64> {
        if self.middle == 0.0 {
            return None;
        }
        Some((self.upper - self.lower) / self.middle)
    }
}

/// Bollinger Bands around an SMA, using the sample standard deviation of the
/// same window.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
    sma: Sma,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Result<Self, Report<IndicatorError>> {
        if period < 2 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be >= 2".into(),
            });
        }
        if std_dev_multiplier <= 0.0 {
            bail!(IndicatorError::InvalidParameter {
                name: "std_dev_multiplier must be > 0".into(),
            });
        }
        Ok(Self {
            period,
            std_dev_multiplier,
            sma: Sma::new(period)?,
        })
    }

    pub fn calculate_bands(&self, bars: &[PriceBar]) -> Vec<Option<Bands>> {
        let prices = close_prices(bars);
        self.sma
            .calculate_values(&prices)
            .iter()
            .enumerate()
            .map(|(i, middle)| {
                let middle = (*middle)?;
                let window = &prices[i + 1 - self.period..=i];
                let variance = window.iter().map(|&p| (p - middle).powi(2)).sum::<f64>()
                    / (self.period - 1) as f64;
                let std_dev = variance.sqrt();
                Some(Bands {
                    upper: middle + self.std_dev_multiplier * std_dev,
                    middle,
                    lower: middle - self.std_dev_multiplier * std_dev,
                })
            })
            .collect()
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    /// Returns middle band (SMA) values only.
    fn calculate(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        self.calculate_bands(bars)
            .into_iter()
            .map(|b| b.map(|b| b.middle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::bars_from_closes;

    #[test]
    fn bollinger_period_too_small_invalid() {
        assert!(BollingerBands::new(1, 2.0).is_err());
    }

    #[test]
    fn bollinger_negative_multiplier_invalid() {
        assert!(BollingerBands::new(20, -1.0).is_err());
    }

    #[test]
    fn bollinger_insufficient_data_is_undefined() {
        let bb = BollingerBands::new(5, 2.0).unwrap();
        let bands = bb.calculate_bands(&bars_from_closes(&[1.0; 4]));
        assert!(bands.iter().all(Option::is_none));
    }

    #[test]
    fn bollinger_flat_prices_zero_width() {
        let bb = BollingerBands::new(3, 2.0).unwrap();
        let bands = bb.calculate_bands(&bars_from_closes(&[10.0_f64; 5]));
        for band in bands.into_iter().flatten() {
            assert!((band.upper - 10.0).abs() < 1e-9);
            assert!((band.lower - 10.0).abs() < 1e-9);
            assert!(band.width().unwrap().abs() < 1e-9);
        }
    }

    #[test]
    fn bollinger_uses_sample_std_dev() {
        let bb = BollingerBands::new(3, 2.0).unwrap();
        let bands = bb.calculate_bands(&bars_from_closes(&[1.0, 2.0, 3.0]));
        // sample std of [1,2,3] is 1.0
        let band = bands[2].unwrap();
        assert!((band.middle - 2.0).abs() < 1e-9);
        assert!((band.upper - 4.0).abs() < 1e-9);
        assert!((band.lower - 0.0).abs() < 1e-9);
        assert!((band.width().unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn bollinger_bands_symmetry() {
        let bb = BollingerBands::new(3, 2.0).unwrap();
        let bands = bb.calculate_bands(&bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        for band in bands.into_iter().flatten() {
            assert!((band.upper - band.middle - (band.middle - band.lower)).abs() < 1e-9);
        }
    }
}
