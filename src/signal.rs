use std::fmt;

use serde::Serialize;

use crate::config::SignalConfig;
use crate::model::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Buy,
    Sell,
    Neutral,
}

/// The fixed vocabulary of signal tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    RsiOversold,
    RsiOverbought,
    RsiBuyZone,
    MacdBullishCrossover,
    MacdBearishCrossover,
    PriceCrossedAboveSma,
    PriceCrossedBelowSma,
    PriceBelowLowerBand,
    PriceAboveUpperBand,
    GoldenCross,
    DeathCross,
    HighVolume,
}

impl Signal {
    pub fn polarity(self) -> Polarity {
        match self {
            Self::RsiOversold
            | Self::RsiBuyZone
            | Self::MacdBullishCrossover
            | Self::PriceCrossedAboveSma
            | Self::PriceBelowLowerBand
            | Self::GoldenCross => Polarity::Buy,
            Self::RsiOverbought
            | Self::MacdBearishCrossover
            | Self::PriceCrossedBelowSma
            | Self::PriceAboveUpperBand
            | Self::DeathCross => Polarity::Sell,
            Self::HighVolume => Polarity::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RsiOversold => "RSI oversold",
            Self::RsiOverbought => "RSI overbought",
            Self::RsiBuyZone => "RSI in buy zone",
            Self::MacdBullishCrossover => "MACD bullish crossover",
            Self::MacdBearishCrossover => "MACD bearish crossover",
            Self::PriceCrossedAboveSma => "Price crossed above medium SMA",
            Self::PriceCrossedBelowSma => "Price crossed below medium SMA",
            Self::PriceBelowLowerBand => "Price below lower Bollinger Band",
            Self::PriceAboveUpperBand => "Price above upper Bollinger Band",
            Self::GoldenCross => "Golden cross",
            Self::DeathCross => "Death cross",
            Self::HighVolume => "High volume",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Signals from one comparison, split by polarity, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalSet {
    pub buy: Vec<Signal>,
    pub sell: Vec<Signal>,
    pub neutral: Vec<Signal>,
}

impl SignalSet {
    fn push(&mut self, signal: Signal) {
        match signal.polarity() {
            Polarity::Buy => self.buy.push(signal),
            Polarity::Sell => self.sell.push(signal),
            Polarity::Neutral => self.neutral.push(signal),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buy.is_empty() && self.sell.is_empty() && self.neutral.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, signal: Signal) -> bool {
        self.buy
            .iter()
            .chain(&self.sell)
            .chain(&self.neutral)
            .any(|s| *s == signal)
    }
}

/// Direction of a crossing between two series across consecutive rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cross {
    Above,
    Below,
}

/// `a` crossing `b` between the previous and the current row. Any undefined
/// operand means no crossing.
fn crossing(
    previous: (Option<f64>, Option<f64>),
    current: (Option<f64>, Option<f64>),
) -> Option<Cross> {
    let (prev_a, prev_b) = (previous.0?, previous.1?);
    let (cur_a, cur_b) = (current.0?, current.1?);
    if cur_a > cur_b && prev_a <= prev_b {
        Some(Cross::Above)
    } else if cur_a < cur_b && prev_a >= prev_b {
        Some(Cross::Below)
    } else {
        None
    }
}

/// Compare the latest snapshot with the one before it.
///
/// Without a previous snapshot nothing fires. Rules are evaluated
/// independently; within one rule the bullish and bearish variants are
/// mutually exclusive.
pub fn generate_signals(
    current: &IndicatorSnapshot,
    previous: Option<&IndicatorSnapshot>,
    config: &SignalConfig,
) -> SignalSet {
    let mut signals = SignalSet::default();
    let Some(previous) = previous else {
        return signals;
    };
    let price = current.close();

    if let Some(rsi) = current.rsi {
        if rsi < config.rsi_oversold {
            signals.push(Signal::RsiOversold);
        } else if rsi > config.rsi_overbought {
            signals.push(Signal::RsiOverbought);
        } else if rsi <= config.rsi_buy_zone_high {
            signals.push(Signal::RsiBuyZone);
        }
    }

    match crossing(
        (Some(previous.macd), Some(previous.macd_signal)),
        (Some(current.macd), Some(current.macd_signal)),
    ) {
        Some(Cross::Above) => signals.push(Signal::MacdBullishCrossover),
        Some(Cross::Below) => signals.push(Signal::MacdBearishCrossover),
        None => {}
    }

    match crossing(
        (Some(previous.close()), previous.sma_medium),
        (Some(price), current.sma_medium),
    ) {
        Some(Cross::Above) => signals.push(Signal::PriceCrossedAboveSma),
        Some(Cross::Below) => signals.push(Signal::PriceCrossedBelowSma),
        None => {}
    }

    if current.bb_lower.is_some_and(|lower| price < lower) {
        signals.push(Signal::PriceBelowLowerBand);
    } else if current.bb_upper.is_some_and(|upper| price > upper) {
        signals.push(Signal::PriceAboveUpperBand);
    }

    match crossing(
        (previous.sma_medium, previous.sma_long),
        (current.sma_medium, current.sma_long),
    ) {
        Some(Cross::Above) => signals.push(Signal::GoldenCross),
        Some(Cross::Below) => signals.push(Signal::DeathCross),
        None => {}
    }

    if current
        .volume_ratio
        .is_some_and(|ratio| ratio > config.high_volume_ratio)
    {
        signals.push(Signal::HighVolume);
    }

    signals
}
