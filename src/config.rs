use std::collections::HashSet;
use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_data_dir() -> String {
    "./data".into()
}

fn default_max_workers() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub signals: SignalConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub screener: ScreenerConfig,
    #[serde(default)]
    pub tickers: Vec<String>,
}

impl AppConfig {
    /// Thresholds and windows for the per-instrument pipeline.
    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            indicators: self.indicators.clone(),
            signals: self.signals.clone(),
            strategy: self.strategy.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Directory holding `<TICKER>.json` price files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

/// Window lengths for the indicator engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_short: usize,
    pub sma_medium: usize,
    pub sma_long: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub atr_period: usize,
    pub volume_period: usize,
    pub roc_period: usize,
    pub level_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_medium: 50,
            sma_long: 200,
            ema_fast: 12,
            ema_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            atr_period: 14,
            volume_period: 20,
            roc_period: 10,
            level_window: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Upper bound of the RSI "buy zone" that starts at `rsi_oversold`.
    pub rsi_buy_zone_high: f64,
    pub high_volume_ratio: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            rsi_buy_zone_high: 50.0,
            high_volume_ratio: 1.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub atr_stop_multiple: f64,
    pub atr_target_multiple: f64,
    pub atr_extended_target_multiple: f64,
    pub mean_reversion_rsi: f64,
    /// Maximum distance from resistance, as a fraction of price.
    pub breakout_proximity: f64,
    pub breakout_volume_ratio: f64,
    pub squeeze_width: f64,
    pub pullback_rsi_low: f64,
    pub pullback_rsi_high: f64,
    pub pullback_extended_target: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            atr_stop_multiple: 2.0,
            atr_target_multiple: 2.0,
            atr_extended_target_multiple: 3.0,
            mean_reversion_rsi: 30.0,
            breakout_proximity: 0.02,
            breakout_volume_ratio: 1.2,
            squeeze_width: 0.1,
            pullback_rsi_low: 40.0,
            pullback_rsi_high: 50.0,
            pullback_extended_target: 1.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    /// Case-insensitive phrases; an empty list disables the AI filter.
    pub ai_keywords: Vec<String>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            min_market_cap: 300_000_000.0,
            max_market_cap: 5_000_000_000.0,
            ai_keywords: [
                "ai",
                "artificial intelligence",
                "machine learning",
                "ml",
                "deep learning",
                "neural network",
                "computer vision",
                "nlp",
                "natural language",
                "robotics",
                "automation",
                "intelligent",
                "cognitive",
                "data analytics",
                "predictive analytics",
                "big data",
                "cloud ai",
                "ai platform",
                "conversational ai",
                "chatbot",
                "llm",
                "generative ai",
                "genai",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Everything the per-instrument pipeline needs, passed explicitly into each
/// stage.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub indicators: IndicatorConfig,
    pub signals: SignalConfig,
    pub strategy: StrategyConfig,
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_windows(&config.indicators)?;
    validate_signal_thresholds(&config.signals)?;
    validate_market_cap_range(&config.screener)?;
    validate_tickers_unique(config)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_LOG_FORMATS.contains(&config.general.log_format.as_str()) {
        return Err(invalid(format!(
            "general.log_format \"{}\" is not valid",
            config.general.log_format
        )));
    }
    if config.general.max_workers == 0 {
        return Err(invalid("general.max_workers must be > 0".into()));
    }
    Ok(())
}

fn validate_windows(indicators: &IndicatorConfig) -> Result<(), Report<ConfigError>> {
    let windows = [
        ("sma_short", indicators.sma_short),
        ("sma_medium", indicators.sma_medium),
        ("sma_long", indicators.sma_long),
        ("ema_fast", indicators.ema_fast),
        ("ema_slow", indicators.ema_slow),
        ("macd_signal", indicators.macd_signal),
        ("rsi_period", indicators.rsi_period),
        ("atr_period", indicators.atr_period),
        ("volume_period", indicators.volume_period),
        ("roc_period", indicators.roc_period),
        ("level_window", indicators.level_window),
    ];
    for (name, window) in windows {
        if window == 0 {
            return Err(invalid(format!("indicators.{name} must be > 0")));
        }
    }
    let sma_ordered = indicators.sma_short < indicators.sma_medium
        && indicators.sma_medium < indicators.sma_long;
    if !sma_ordered {
        return Err(invalid(format!(
            "indicators: expected sma_short ({}) < sma_medium ({}) < sma_long ({})",
            indicators.sma_short, indicators.sma_medium, indicators.sma_long
        )));
    }
    if indicators.ema_fast >= indicators.ema_slow {
        return Err(invalid(
            "indicators.ema_fast must be < indicators.ema_slow".into(),
        ));
    }
    if indicators.bollinger_period < 2 {
        return Err(invalid("indicators.bollinger_period must be >= 2".into()));
    }
    if indicators.bollinger_std_dev <= 0.0 {
        return Err(invalid("indicators.bollinger_std_dev must be > 0".into()));
    }
    Ok(())
}

fn validate_signal_thresholds(signals: &SignalConfig) -> Result<(), Report<ConfigError>> {
    let ordered = signals.rsi_oversold < signals.rsi_buy_zone_high
        && signals.rsi_buy_zone_high < signals.rsi_overbought;
    if !ordered {
        return Err(invalid(format!(
            "signals: expected rsi_oversold ({}) < rsi_buy_zone_high ({}) < rsi_overbought ({})",
            signals.rsi_oversold, signals.rsi_buy_zone_high, signals.rsi_overbought
        )));
    }
    Ok(())
}

fn validate_market_cap_range(screener: &ScreenerConfig) -> Result<(), Report<ConfigError>> {
    if screener.min_market_cap >= screener.max_market_cap {
        return Err(invalid(format!(
            "screener.min_market_cap ({}) must be < max_market_cap ({})",
            screener.min_market_cap, screener.max_market_cap
        )));
    }
    Ok(())
}

fn validate_tickers_unique(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let mut seen = HashSet::new();
    for ticker in &config.tickers {
        if !seen.insert(ticker.to_uppercase()) {
            return Err(invalid(format!("tickers: duplicate ticker \"{ticker}\"")));
        }
    }
    Ok(())
}
