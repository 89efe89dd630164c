use error_stack::Report;
use tracing::debug;

use crate::config::IndicatorConfig;
use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::atr::Atr;
use crate::indicator::bollinger::BollingerBands;
use crate::indicator::levels::SupportResistance;
use crate::indicator::ma::Sma;
use crate::indicator::macd::Macd;
use crate::indicator::momentum::{Momentum, Roc};
use crate::indicator::rsi::Rsi;
use crate::indicator::volume::VolumeMA;
use crate::model::{IndicatorSnapshot, PriceSeries};

/// The full indicator set, built once from an [`IndicatorConfig`].
pub struct IndicatorEngine {
    sma_short: Sma,
    sma_medium: Sma,
    sma_long: Sma,
    macd: Macd,
    rsi: Rsi,
    bollinger: BollingerBands,
    atr: Atr,
    volume: VolumeMA,
    roc: Roc,
    momentum: Momentum,
    levels: SupportResistance,
}

impl IndicatorEngine {
    pub fn new(config: &IndicatorConfig) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            sma_short: Sma::new(config.sma_short)?,
            sma_medium: Sma::new(config.sma_medium)?,
            sma_long: Sma::new(config.sma_long)?,
            macd: Macd::new(config.ema_fast, config.ema_slow, config.macd_signal)?,
            rsi: Rsi::new(config.rsi_period)?,
            bollinger: BollingerBands::new(config.bollinger_period, config.bollinger_std_dev)?,
            atr: Atr::new(config.atr_period)?,
            volume: VolumeMA::new(config.volume_period)?,
            roc: Roc::new(config.roc_period)?,
            momentum: Momentum::new(config.roc_period)?,
            levels: SupportResistance::new(config.level_window)?,
        })
    }

    /// Enrich every bar of `series`. Output is parallel to the input.
    pub fn compute(&self, series: &PriceSeries) -> Vec<IndicatorSnapshot> {
        if series.is_empty() {
            return Vec::new();
        }
        let bars = series.bars();

        let sma_short = self.sma_short.calculate(bars);
        let sma_medium = self.sma_medium.calculate(bars);
        let sma_long = self.sma_long.calculate(bars);
        let (ema_fast, ema_slow, macd) = self.macd.calculate_full(bars);
        let rsi = self.rsi.calculate(bars);
        let bands = self.bollinger.calculate_bands(bars);
        let atr = self.atr.calculate(bars);
        let volume_sma = self.volume.calculate(bars);
        let volume_ratio = self.volume.ratios(bars, &volume_sma);
        let roc = self.roc.calculate(bars);
        let momentum = self.momentum.calculate(bars);
        let levels = self.levels.calculate_levels(bars);

        debug!(
            ticker = series.ticker(),
            bars = series.len(),
            longest_window = self.sma_long.required_bars(),
            "indicators computed"
        );

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let band = bands[i];
                let level = levels[i];
                IndicatorSnapshot {
                    bar: *bar,
                    sma_short: sma_short[i],
                    sma_medium: sma_medium[i],
                    sma_long: sma_long[i],
                    ema_fast: ema_fast[i],
                    ema_slow: ema_slow[i],
                    macd: macd[i].line,
                    macd_signal: macd[i].signal,
                    macd_histogram: macd[i].histogram,
                    rsi: rsi[i],
                    bb_middle: band.map(|b| b.middle),
                    bb_upper: band.map(|b| b.upper),
                    bb_lower: band.map(|b| b.lower),
                    bb_width: band.and_then(|b| b.width()),
                    atr: atr[i],
                    atr_percent: atr[i].map(|a| a / bar.close * 100.0),
                    volume_sma: volume_sma[i],
                    volume_ratio: volume_ratio[i],
                    roc: roc[i],
                    momentum: momentum[i],
                    support: level.map(|l| l.support),
                    resistance: level.map(|l| l.resistance),
                }
            })
            .collect()
    }
}

/// Build an engine from `config` and enrich `series` in one call.
pub fn compute_indicators(
    series: &PriceSeries,
    config: &IndicatorConfig,
) -> Result<Vec<IndicatorSnapshot>, Report<IndicatorError>> {
    Ok(IndicatorEngine::new(config)?.compute(series))
}
