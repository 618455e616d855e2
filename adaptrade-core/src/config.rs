//! Serializable robot configuration.
//!
//! One TOML file drives every component. Every field has a default, so an
//! empty file (or no file) yields the stock configuration.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Complete configuration snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub risk: RiskParameters,
    pub strategy: StrategyParameters,
    pub selection: SelectionParameters,
    pub runner: RunnerParameters,
    pub logging: LoggingParameters,
}

/// Risk budget read by the risk engine. Stop percentages are fractions of price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskParameters {
    /// Fraction of account balance risked per trade.
    pub risk_per_trade: f64,
    /// Floor for the percentage stop, applied regardless of volatility.
    pub min_stop_loss_percent: f64,
    pub stop_loss_percent: f64,
    /// Take-profit distance as a multiple of the stop distance.
    pub take_profit_ratio: f64,
    pub atr_stop_multiplier: f64,
    pub atr_period: usize,
    /// Cap on position value as a fraction of account balance.
    pub max_position_share_per_instrument: f64,
    pub max_trades_per_instrument_per_day: u32,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            risk_per_trade: 0.01,
            min_stop_loss_percent: 0.002,
            stop_loss_percent: 0.005,
            take_profit_ratio: 2.0,
            atr_stop_multiplier: 1.5,
            atr_period: 14,
            max_position_share_per_instrument: 0.2,
            max_trades_per_instrument_per_day: 5,
        }
    }
}

impl RiskParameters {
    /// Stop distance as a fraction of price, never below the floor.
    pub fn effective_stop_percent(&self) -> f64 {
        self.stop_loss_percent.max(self.min_stop_loss_percent)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("risk.risk_per_trade", self.risk_per_trade)?;
        positive("risk.min_stop_loss_percent", self.min_stop_loss_percent)?;
        positive("risk.stop_loss_percent", self.stop_loss_percent)?;
        positive("risk.take_profit_ratio", self.take_profit_ratio)?;
        positive("risk.atr_stop_multiplier", self.atr_stop_multiplier)?;
        positive(
            "risk.max_position_share_per_instrument",
            self.max_position_share_per_instrument,
        )?;
        if self.risk_per_trade >= 1.0 {
            return Err(ConfigError::invalid("risk.risk_per_trade", "must be below 1"));
        }
        if self.atr_period == 0 {
            return Err(ConfigError::invalid("risk.atr_period", "must be >= 1"));
        }
        if self.max_trades_per_instrument_per_day == 0 {
            return Err(ConfigError::invalid(
                "risk.max_trades_per_instrument_per_day",
                "must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Regime classification, both rule sets and the volume filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyParameters {
    pub adx_period: usize,
    /// ADX strictly above this marks a trending market.
    pub adx_trend_threshold: f64,
    pub min_candles_for_signal: usize,
    pub volume_confirmation_window: usize,
    pub volume_spike_factor: f64,
    pub ma_fast_period: usize,
    pub ma_slow_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            adx_period: 14,
            adx_trend_threshold: 25.0,
            min_candles_for_signal: 60,
            volume_confirmation_window: 20,
            volume_spike_factor: 1.2,
            ma_fast_period: 9,
            ma_slow_period: 21,
            bb_period: 20,
            bb_std_dev: 2.0,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

impl StrategyParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, period) in [
            ("strategy.adx_period", self.adx_period),
            ("strategy.ma_fast_period", self.ma_fast_period),
            ("strategy.bb_period", self.bb_period),
            ("strategy.rsi_period", self.rsi_period),
        ] {
            if period == 0 {
                return Err(ConfigError::invalid(field, "must be >= 1"));
            }
        }
        if self.ma_fast_period >= self.ma_slow_period {
            return Err(ConfigError::invalid(
                "strategy.ma_slow_period",
                format!(
                    "must exceed ma_fast_period ({} >= {})",
                    self.ma_fast_period, self.ma_slow_period
                ),
            ));
        }
        positive("strategy.adx_trend_threshold", self.adx_trend_threshold)?;
        positive("strategy.bb_std_dev", self.bb_std_dev)?;
        if self.volume_spike_factor.is_nan() || self.volume_spike_factor <= 1.0 {
            return Err(ConfigError::invalid(
                "strategy.volume_spike_factor",
                "must be greater than 1",
            ));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(ConfigError::invalid(
                "strategy.rsi_oversold",
                "thresholds must satisfy 0 <= oversold < overbought <= 100",
            ));
        }
        Ok(())
    }
}

/// Daily pick of the most volatile instruments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionParameters {
    pub top_volatile_count: usize,
    pub volatility_period_days: u32,
    pub atr_period: usize,
}

impl Default for SelectionParameters {
    fn default() -> Self {
        Self {
            top_volatile_count: 10,
            volatility_period_days: 30,
            atr_period: 14,
        }
    }
}

/// Scheduling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunnerParameters {
    pub poll_interval_secs: u64,
    pub intraday_lookback_days: u32,
    pub min_cycle_bars: usize,
    /// IANA name of the exchange timezone the daily times refer to.
    pub exchange_timezone: String,
    /// `HH:MM`, exchange local time.
    pub daily_reset_time: String,
    /// `HH:MM`, exchange local time.
    pub selection_time: String,
    pub sandbox: bool,
}

impl Default for RunnerParameters {
    fn default() -> Self {
        Self {
            poll_interval_secs: 15,
            intraday_lookback_days: 2,
            min_cycle_bars: 50,
            exchange_timezone: "Europe/Moscow".to_string(),
            daily_reset_time: "00:01".to_string(),
            selection_time: "09:00".to_string(),
            sandbox: true,
        }
    }
}

impl RunnerParameters {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.exchange_timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::invalid("runner.exchange_timezone", e.to_string()))
    }

    pub fn reset_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_time("runner.daily_reset_time", &self.daily_reset_time)
    }

    pub fn selection_at(&self) -> Result<NaiveTime, ConfigError> {
        parse_time("runner.selection_time", &self.selection_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingParameters {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingParameters {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk.validate()?;
        self.strategy.validate()?;
        if self.selection.atr_period == 0 {
            return Err(ConfigError::invalid("selection.atr_period", "must be >= 1"));
        }
        self.runner.timezone()?;
        self.runner.reset_time()?;
        self.runner.selection_at()?;
        Ok(())
    }

    /// BLAKE3 digest of the canonical JSON form; identifies the live configuration.
    pub fn fingerprint(&self) -> String {
        let canonical =
            serde_json::to_vec(self).unwrap_or_else(|_| format!("{self:?}").into_bytes());
        blake3::hash(&canonical).to_hex().to_string()
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| ConfigError::invalid(field, format!("`{value}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.risk.max_trades_per_instrument_per_day, 5);
        assert_eq!(settings.strategy.ma_slow_period, 21);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            [risk]
            risk_per_trade = 0.02

            [strategy]
            adx_trend_threshold = 30.0
            "#,
        )
        .unwrap();
        assert_eq!(settings.risk.risk_per_trade, 0.02);
        assert_eq!(settings.risk.take_profit_ratio, 2.0);
        assert_eq!(settings.strategy.adx_trend_threshold, 30.0);
        assert_eq!(settings.strategy.adx_period, 14);
    }

    #[test]
    fn rejects_non_positive_risk() {
        let err = Settings::from_toml("[risk]\nrisk_per_trade = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "risk.risk_per_trade",
                ..
            }
        ));
    }

    #[test]
    fn rejects_fast_not_below_slow() {
        let err =
            Settings::from_toml("[strategy]\nma_fast_period = 21\nma_slow_period = 9").unwrap_err();
        assert!(err.to_string().contains("ma_slow_period"));
    }

    #[test]
    fn rejects_spike_factor_at_one() {
        assert!(Settings::from_toml("[strategy]\nvolume_spike_factor = 1.0").is_err());
    }

    #[test]
    fn rejects_bad_timezone_and_time() {
        assert!(Settings::from_toml("[runner]\nexchange_timezone = \"Mars/Olympus\"").is_err());
        assert!(Settings::from_toml("[runner]\ndaily_reset_time = \"25:00\"").is_err());
    }

    #[test]
    fn parses_times() {
        let runner = RunnerParameters::default();
        assert_eq!(runner.reset_time().unwrap(), NaiveTime::from_hms_opt(0, 1, 0).unwrap());
        assert_eq!(runner.selection_at().unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(runner.timezone().unwrap(), chrono_tz::Europe::Moscow);
    }

    #[test]
    fn effective_stop_percent_floors() {
        let mut risk = RiskParameters::default();
        assert_eq!(risk.effective_stop_percent(), 0.005);
        risk.stop_loss_percent = 0.001;
        assert_eq!(risk.effective_stop_percent(), 0.002);
    }

    #[test]
    fn fingerprint_deterministic_and_sensitive() {
        let a = Settings::default();
        let mut b = Settings::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.risk.risk_per_trade = 0.02;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            Settings::from_toml("[risk\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
