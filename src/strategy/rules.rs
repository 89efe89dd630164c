use crate::config::StrategyConfig;
use crate::model::{IndicatorSnapshot, TrendLabel};
use crate::signal::SignalSet;
use crate::strategy::{PriceLevel, StrategyKind, StrategySuggestion};

/// Evaluate every strategy rule against the latest snapshot.
///
/// Rules are independent: each one that matches appends a suggestion, in
/// rule order. A rule whose price levels are undefined does not match.
pub fn recommend_strategies(
    trend: TrendLabel,
    latest: &IndicatorSnapshot,
    signals: &SignalSet,
    config: &StrategyConfig,
) -> Vec<StrategySuggestion> {
    [
        trend_following(trend, latest, signals, config),
        mean_reversion(latest, config),
        breakout(latest, config),
        volatility_expansion(latest, config),
        pullback_buy(trend, latest, config),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn trend_following(
    trend: TrendLabel,
    latest: &IndicatorSnapshot,
    signals: &SignalSet,
    config: &StrategyConfig,
) -> Option<StrategySuggestion> {
    if !trend.is_uptrend() {
        return None;
    }
    let price = latest.close();
    let atr = latest.atr?;

    let mut rationale = format!("{trend} with bullish momentum");
    if !signals.buy.is_empty() {
        let confirmations: Vec<&str> = signals.buy.iter().map(|s| s.label()).collect();
        rationale.push_str(&format!("; confirmed by {}", confirmations.join(", ")));
    }

    Some(StrategySuggestion {
        kind: StrategyKind::TrendFollowing,
        entry: "On pullback to the short SMA".into(),
        stop_loss: PriceLevel::Price(price - config.atr_stop_multiple * atr),
        take_profit_1: PriceLevel::Price(price + config.atr_target_multiple * atr),
        take_profit_2: Some(PriceLevel::Price(
            price + config.atr_extended_target_multiple * atr,
        )),
        position_size: "Based on ATR risk".into(),
        rationale,
        risk_reward: "1:2 to 1:3".into(),
    })
}

fn mean_reversion(
    latest: &IndicatorSnapshot,
    config: &StrategyConfig,
) -> Option<StrategySuggestion> {
    let price = latest.close();
    let oversold = latest.rsi.is_some_and(|rsi| rsi < config.mean_reversion_rsi);
    let below_band = latest.bb_lower.is_some_and(|lower| price < lower);
    if !(oversold || below_band) {
        return None;
    }
    let support = latest.support?;
    let middle = latest.bb_middle?;
    let sma_short = latest.sma_short?;

    Some(StrategySuggestion {
        kind: StrategyKind::MeanReversion,
        entry: format!("Current price (${price:.2}) is oversold"),
        stop_loss: PriceLevel::Price(support),
        take_profit_1: PriceLevel::Price(middle),
        take_profit_2: Some(PriceLevel::Price(sma_short)),
        position_size: "Half position initially, scale in if lower".into(),
        rationale: "Oversold conditions, likely bounce".into(),
        risk_reward: "1:2".into(),
    })
}

fn breakout(latest: &IndicatorSnapshot, config: &StrategyConfig) -> Option<StrategySuggestion> {
    let price = latest.close();
    let resistance = latest.resistance?;
    let volume_ratio = latest.volume_ratio?;

    let near_resistance = (price - resistance).abs() / price < config.breakout_proximity;
    if !near_resistance || volume_ratio <= config.breakout_volume_ratio {
        return None;
    }
    let support = latest.support?;
    let sma_short = latest.sma_short?;
    let range = resistance - support;

    Some(StrategySuggestion {
        kind: StrategyKind::Breakout,
        entry: format!("Above ${resistance:.2} (resistance)"),
        stop_loss: PriceLevel::Price(sma_short),
        take_profit_1: PriceLevel::Price(resistance + range),
        take_profit_2: Some(PriceLevel::Price(resistance + 2.0 * range)),
        position_size: "Normal position on confirmed breakout".into(),
        rationale: "Near resistance with volume pickup".into(),
        risk_reward: "1:2 to 1:3".into(),
    })
}

fn volatility_expansion(
    latest: &IndicatorSnapshot,
    config: &StrategyConfig,
) -> Option<StrategySuggestion> {
    let width = latest.bb_width?;
    if width >= config.squeeze_width {
        return None;
    }

    Some(StrategySuggestion {
        kind: StrategyKind::VolatilityExpansion,
        entry: "Breakout from consolidation (either direction)".into(),
        stop_loss: PriceLevel::Note("Opposite side of consolidation range".into()),
        take_profit_1: PriceLevel::Note("ATR-based target".into()),
        take_profit_2: None,
        position_size: "Smaller due to directional uncertainty".into(),
        rationale: "Bollinger Band squeeze - volatility likely to expand".into(),
        risk_reward: "1:2".into(),
    })
}

fn pullback_buy(
    trend: TrendLabel,
    latest: &IndicatorSnapshot,
    config: &StrategyConfig,
) -> Option<StrategySuggestion> {
    if trend != TrendLabel::StrongUptrend {
        return None;
    }
    let rsi = latest.rsi?;
    if !(config.pullback_rsi_low..=config.pullback_rsi_high).contains(&rsi) {
        return None;
    }
    let sma_short = latest.sma_short?;
    let sma_medium = latest.sma_medium?;
    let resistance = latest.resistance?;

    Some(StrategySuggestion {
        kind: StrategyKind::PullbackBuy,
        entry: format!("At short SMA (${sma_short:.2})"),
        stop_loss: PriceLevel::Price(sma_medium),
        take_profit_1: PriceLevel::Price(resistance),
        take_profit_2: Some(PriceLevel::Price(
            resistance * config.pullback_extended_target,
        )),
        position_size: "Standard position".into(),
        rationale: "Healthy pullback in strong uptrend".into(),
        risk_reward: "1:2+".into(),
    })
}
