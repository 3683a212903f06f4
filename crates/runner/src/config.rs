use chrono::NaiveTime;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use vigil_monitor::{MonitorConfig, TradingWindow};
use vigil_risk::RiskEngineConfig;
use vigil_scheduler::IntervalTable;
use vigil_ports::ConfigError;

/// Environment variable naming the JSON config file. Unset means
/// built-in defaults.
pub const ENV_CONFIG_PATH: &str = "VIGIL_CONFIG";

/// Jobs whose cadence follows the market regime.
pub const ADAPTIVE_JOBS: [&str; 2] = ["intraday_monitor", "market_pulse"];

/// Top-level engine configuration
///
/// Every field has a default, so a partial config file only overrides
/// what it names. Validation runs once at startup and is fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub intervals: IntervalTable,
    pub monitor: MonitorSettings,
    pub risk: RiskSettings,
    /// Cadence of the scheduled risk report, seconds
    pub risk_report_interval_secs: u64,
    /// Bound on the alert intent channel
    pub alert_channel_capacity: usize,
    /// How long shutdown waits for in-flight jobs, seconds
    pub shutdown_grace_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            intervals: IntervalTable::default(),
            monitor: MonitorSettings::default(),
            risk: RiskSettings::default(),
            risk_report_interval_secs: 21_600,
            alert_channel_capacity: 256,
            shutdown_grace_secs: 30,
        }
    }
}

impl Config {
    /// Load from the file named by `VIGIL_CONFIG`, or defaults when
    /// the variable is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var(ENV_CONFIG_PATH) {
            Ok(path) => Self::load_from_path(Path::new(&path)),
            Err(_) => {
                info!("{ENV_CONFIG_PATH} not set, using built-in defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.intervals.validate(&ADAPTIVE_JOBS)?;
        self.monitor.to_monitor_config()?;
        if self.risk_report_interval_secs == 0 {
            return Err(ConfigError::Parse(
                "risk_report_interval_secs must be positive".to_string(),
            ));
        }
        if self.alert_channel_capacity == 0 {
            return Err(ConfigError::Parse(
                "alert_channel_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Config surface of the realtime rules; converted into
/// [`MonitorConfig`] after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub surge_threshold: Decimal,
    pub surge_cooldown_secs: i64,
    pub sell_cooldown_secs: i64,
    pub min_surge_score: f64,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    /// Market UTC offset in hours
    pub market_utc_offset_hours: i32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        let defaults = MonitorConfig::default();
        Self {
            surge_threshold: defaults.surge_threshold,
            surge_cooldown_secs: defaults.surge_cooldown_secs,
            sell_cooldown_secs: defaults.sell_cooldown_secs,
            min_surge_score: defaults.min_surge_score,
            window_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            window_end: NaiveTime::from_hms_opt(15, 20, 0).unwrap_or_default(),
            market_utc_offset_hours: 9,
        }
    }
}

impl MonitorSettings {
    pub fn to_monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        let trading_window = TradingWindow::new(
            self.window_start,
            self.window_end,
            self.market_utc_offset_hours,
        )?;
        Ok(MonitorConfig {
            surge_threshold: self.surge_threshold,
            surge_cooldown_secs: self.surge_cooldown_secs,
            sell_cooldown_secs: self.sell_cooldown_secs,
            min_surge_score: self.min_surge_score,
            trading_window,
        })
    }
}

/// Config surface of the risk report job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub confidence: f64,
    pub holding_period_days: u32,
    pub simulations: usize,
    pub horizon_days: u32,
    pub correlation_threshold: f64,
    /// Vendor-style range string for price histories
    pub history_period: String,
    /// Ticker -> sector, used by the stress tester; unlisted tickers
    /// fall into "other"
    pub sectors: BTreeMap<String, String>,
}

impl Default for RiskSettings {
    fn default() -> Self {
        let engine = RiskEngineConfig::default();
        Self {
            confidence: engine.confidence,
            holding_period_days: engine.holding_period_days,
            simulations: engine.mc_simulations,
            horizon_days: engine.mc_horizon_days,
            correlation_threshold: engine.correlation_threshold,
            history_period: "6mo".to_string(),
            sectors: BTreeMap::new(),
        }
    }
}

impl RiskSettings {
    pub fn engine_config(&self) -> RiskEngineConfig {
        RiskEngineConfig {
            confidence: self.confidence,
            holding_period_days: self.holding_period_days,
            mc_simulations: self.simulations,
            mc_horizon_days: self.horizon_days,
            correlation_threshold: self.correlation_threshold,
        }
    }

    pub fn sector_of(&self, ticker: &str) -> String {
        self.sectors
            .get(ticker)
            .cloned()
            .unwrap_or_else(|| "other".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn partial_json_only_overrides_named_fields() {
        let config: Config =
            serde_json::from_str(r#"{"monitor": {"surge_threshold": "5.0"}}"#).unwrap();
        assert_eq!(config.monitor.surge_threshold, dec!(5.0));
        assert_eq!(config.monitor.surge_cooldown_secs, 1800);
        assert_eq!(config.risk.simulations, 10_000);
    }

    #[test]
    fn inverted_trading_window_fails_validation() {
        let mut config = Config::default();
        config.monitor.window_start = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::BadTradingWindow { .. }));
    }

    #[test]
    fn zero_report_interval_fails_validation() {
        let mut config = Config::default();
        config.risk_report_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = Config::load_from_path(Path::new("/nonexistent/vigil.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = env::temp_dir().join("vigil-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{not json").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn sector_lookup_falls_back_to_other() {
        let mut settings = RiskSettings::default();
        settings
            .sectors
            .insert("005930".to_string(), "technology".to_string());
        assert_eq!(settings.sector_of("005930"), "technology");
        assert_eq!(settings.sector_of("247540"), "other");
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
