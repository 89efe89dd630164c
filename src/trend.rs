use crate::model::{IndicatorSnapshot, TrendLabel};

/// Reduce the latest snapshot to one trend label.
///
/// Checks run in order and the first match wins. Every rule needs the long
/// SMA, so a series shorter than its window is always `Sideways` even when
/// the shorter averages are aligned.
pub fn classify_trend(latest: &IndicatorSnapshot) -> TrendLabel {
    let price = latest.close();
    let Some(long) = latest.sma_long else {
        return TrendLabel::Sideways;
    };
    let aligned = latest.sma_short.zip(latest.sma_medium);

    if let Some((short, medium)) = aligned
        && price > short
        && short > medium
        && medium > long
    {
        return TrendLabel::StrongUptrend;
    }
    if price > long {
        return TrendLabel::Uptrend;
    }
    if let Some((short, medium)) = aligned
        && price < short
        && short < medium
        && medium < long
    {
        return TrendLabel::StrongDowntrend;
    }
    if price < long {
        return TrendLabel::Downtrend;
    }
    TrendLabel::Sideways
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::IndicatorConfig;
    use crate::indicator::engine::compute_indicators;
    use crate::model::fixtures::{rising, series_from_closes};

    fn latest(closes: &[f64]) -> IndicatorSnapshot {
        let series = series_from_closes(closes);
        compute_indicators(&series, &IndicatorConfig::default())
            .unwrap()
            .pop()
            .unwrap()
    }

    fn snapshot_with(price: f64, short: f64, medium: f64, long: Option<f64>) -> IndicatorSnapshot {
        let mut snapshot = latest(&[price]);
        snapshot.sma_short = Some(short);
        snapshot.sma_medium = Some(medium);
        snapshot.sma_long = long;
        snapshot
    }

    #[test]
    fn steady_rise_is_strong_uptrend() {
        assert_eq!(
            classify_trend(&latest(&rising(250, 10.0, 0.5))),
            TrendLabel::StrongUptrend
        );
    }

    #[test]
    fn steady_fall_is_strong_downtrend() {
        assert_eq!(
            classify_trend(&latest(&rising(250, 200.0, -0.5))),
            TrendLabel::StrongDowntrend
        );
    }

    #[test]
    fn flat_series_is_sideways() {
        assert_eq!(classify_trend(&latest(&[42.0; 250])), TrendLabel::Sideways);
    }

    #[test]
    fn above_long_average_without_alignment_is_uptrend() {
        let snapshot = snapshot_with(110.0, 100.0, 105.0, Some(90.0));
        assert_eq!(classify_trend(&snapshot), TrendLabel::Uptrend);
    }

    #[test]
    fn below_long_average_without_alignment_is_downtrend() {
        let snapshot = snapshot_with(80.0, 95.0, 85.0, Some(90.0));
        assert_eq!(classify_trend(&snapshot), TrendLabel::Downtrend);
    }

    #[test]
    fn missing_long_average_is_sideways_even_when_aligned() {
        let snapshot = snapshot_with(110.0, 105.0, 100.0, None);
        assert_eq!(classify_trend(&snapshot), TrendLabel::Sideways);
    }

    proptest! {
        #[test]
        fn short_history_always_sideways(
            closes in proptest::collection::vec(1.0f64..500.0, 1..200),
        ) {
            prop_assert_eq!(classify_trend(&latest(&closes)), TrendLabel::Sideways);
        }
    }
}
