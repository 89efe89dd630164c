pub mod rules;

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    TrendFollowing,
    MeanReversion,
    Breakout,
    VolatilityExpansion,
    PullbackBuy,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::TrendFollowing => "Trend Following - Long",
            Self::MeanReversion => "Mean Reversion - Long",
            Self::Breakout => "Breakout Trading",
            Self::VolatilityExpansion => "Volatility Expansion Play",
            Self::PullbackBuy => "Pullback Buy in Uptrend",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A stop or target: either a concrete price or a qualitative instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PriceLevel {
    Price(f64),
    Note(String),
}

impl PriceLevel {
    pub fn price(&self) -> Option<f64> {
        match self {
            Self::Price(p) => Some(*p),
            Self::Note(_) => None,
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Price(p) => write!(f, "${p:.2}"),
            Self::Note(text) => write!(f, "{text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySuggestion {
    pub kind: StrategyKind,
    pub entry: String,
    pub stop_loss: PriceLevel,
    pub take_profit_1: PriceLevel,
    pub take_profit_2: Option<PriceLevel>,
    pub position_size: String,
    pub rationale: String,
    pub risk_reward: String,
}

impl StrategySuggestion {
    /// Distance from `price` down to a concrete stop, in percent of `price`.
    pub fn stop_distance_percent(&self, price: f64) -> Option<f64> {
        let stop = self.stop_loss.price()?;
        (price > 0.0).then(|| (price - stop) / price * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_level_display() {
        assert_eq!(PriceLevel::Price(12.345).to_string(), "$12.35");
        assert_eq!(
            PriceLevel::Note("ATR-based target".into()).to_string(),
            "ATR-based target"
        );
    }

    #[test]
    fn price_level_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            PriceLevel::Price(1.5),
            PriceLevel::Note("range".into()),
        ])
        .unwrap();
        assert_eq!(json, r#"[1.5,"range"]"#);
    }

    fn suggestion(stop_loss: PriceLevel) -> StrategySuggestion {
        StrategySuggestion {
            kind: StrategyKind::TrendFollowing,
            entry: String::new(),
            stop_loss,
            take_profit_1: PriceLevel::Price(110.0),
            take_profit_2: None,
            position_size: String::new(),
            rationale: String::new(),
            risk_reward: String::new(),
        }
    }

    #[test]
    fn stop_distance_from_concrete_stop() {
        let s = suggestion(PriceLevel::Price(90.0));
        assert!((s.stop_distance_percent(100.0).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn stop_distance_undefined_for_qualitative_stop() {
        let s = suggestion(PriceLevel::Note("Opposite side of consolidation range".into()));
        assert_eq!(s.stop_distance_percent(100.0), None);
    }

    #[test]
    fn strategy_kind_labels() {
        assert_eq!(StrategyKind::Breakout.to_string(), "Breakout Trading");
        assert_eq!(
            serde_json::to_string(&StrategyKind::PullbackBuy).unwrap(),
            "\"pullback_buy\""
        );
    }
}
