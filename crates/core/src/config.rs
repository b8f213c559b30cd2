//! Configuration structures for the replay-trader system.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::PriceField;

/// Main configuration for a backtest run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Historical data configuration.
    pub data: DataConfig,
    /// Portfolio configuration.
    pub portfolio: PortfolioConfig,
    /// Execution configuration.
    pub execution: ExecutionConfig,
    /// Engine / reporting configuration.
    pub backtest: BacktestConfig,
    /// Strategy selection and parameters.
    pub strategy: StrategyConfig,
}

impl Config {
    /// Load a configuration from a JSON file.
    ///
    /// Not validated; callers apply overrides first, then call [`Config::validate`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.data.symbols.is_empty() {
            return Err(Error::config("at least one symbol is required"));
        }
        if let (Some(start), Some(end)) = (self.data.start, self.data.end) {
            if start > end {
                return Err(Error::config(format!("start date {start} is after end date {end}")));
            }
        }
        let capital = self.portfolio.initial_capital;
        if !capital.is_finite() || capital <= 0.0 {
            return Err(Error::config("initial capital must be positive"));
        }
        if self.portfolio.lot_size <= 0 {
            return Err(Error::config("lot size must be positive"));
        }
        self.execution.commission.validate()?;
        if self.backtest.periods_per_year == 0 {
            return Err(Error::config("periods per year must be positive"));
        }
        self.strategy.validate(&self.data.symbols)
    }
}

/// Historical data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding one `<SYMBOL>.csv` file per instrument.
    pub csv_dir: PathBuf,
    /// Instruments to replay.
    pub symbols: Vec<String>,
    /// First date to include (inclusive).
    pub start: Option<NaiveDate>,
    /// Last date to include (inclusive).
    pub end: Option<NaiveDate>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from("data"),
            symbols: Vec::new(),
            start: None,
            end: None,
        }
    }
}

/// Portfolio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Starting cash.
    pub initial_capital: f64,
    /// Fixed lot size for the naive sizing policy.
    pub lot_size: i64,
    /// Bar field used to mark positions to market.
    pub mark_field: PriceField,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            lot_size: 100,
            mark_field: PriceField::AdjClose,
        }
    }
}

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Venue name stamped on fills.
    pub venue: String,
    /// Bar field used as the fill price.
    pub fill_field: PriceField,
    /// Commission schedule.
    pub commission: CommissionConfig,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            venue: "SIMULATED".to_string(),
            fill_field: PriceField::AdjClose,
            commission: CommissionConfig::default(),
        }
    }
}

/// Tiered per-fill commission: `max(minimum, rate * quantity)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionConfig {
    /// Minimum charge per fill.
    pub minimum: f64,
    /// Largest quantity charged at `small_rate`.
    pub tier_threshold: u64,
    /// Per-unit rate up to and including the threshold.
    pub small_rate: f64,
    /// Per-unit rate above the threshold.
    pub large_rate: f64,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            minimum: 1.30,
            tier_threshold: 500,
            small_rate: 0.013,
            large_rate: 0.008,
        }
    }
}

impl CommissionConfig {
    fn validate(&self) -> Result<()> {
        let rates = [self.minimum, self.small_rate, self.large_rate];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(Error::config("commission parameters must be non-negative"));
        }
        Ok(())
    }
}

/// Engine and reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Pause between bars in milliseconds (0 = none).
    pub heartbeat_ms: u64,
    /// Annualization factor for the Sharpe ratio (252 for daily bars).
    pub periods_per_year: u32,
    /// Where to write the equity curve, if anywhere.
    pub equity_csv: Option<PathBuf>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            heartbeat_ms: 0,
            periods_per_year: 252,
            equity_csv: Some(PathBuf::from("equity.csv")),
        }
    }
}

/// Strategy selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Simple moving average crossover on every configured symbol.
    MovingAverageCross {
        short_window: usize,
        long_window: usize,
    },
    /// OLS hedge-ratio mean reversion on a pair.
    OlsPairs {
        /// Dependent leg.
        y: String,
        /// Independent leg.
        x: String,
        ols_window: usize,
        zscore_low: f64,
        zscore_high: f64,
    },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::MovingAverageCross {
            short_window: 100,
            long_window: 400,
        }
    }
}

impl StrategyConfig {
    fn validate(&self, symbols: &[String]) -> Result<()> {
        match self {
            StrategyConfig::MovingAverageCross {
                short_window,
                long_window,
            } => {
                if *short_window == 0 || short_window >= long_window {
                    return Err(Error::config(format!(
                        "moving average windows must satisfy 0 < short ({short_window}) < long ({long_window})"
                    )));
                }
            }
            StrategyConfig::OlsPairs {
                y,
                x,
                ols_window,
                zscore_low,
                zscore_high,
            } => {
                for leg in [y, x] {
                    if !symbols.contains(leg) {
                        return Err(Error::config(format!("pair leg {leg} is not a configured symbol")));
                    }
                }
                if *ols_window < 3 {
                    return Err(Error::config("ols window must hold at least 3 bars"));
                }
                if !(*zscore_low >= 0.0 && zscore_low < zscore_high) {
                    return Err(Error::config("z-score thresholds must satisfy 0 <= low < high"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            data: DataConfig {
                symbols: vec!["AAPL".to_string()],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.portfolio.lot_size, 100);
        assert_eq!(config.execution.commission.minimum, 1.30);
        assert_eq!(config.backtest.periods_per_year, 252);
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_symbols_rejected() {
        assert!(matches!(Config::default().validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "data": { "csv_dir": "/tmp/bars", "symbols": ["AREX", "WLL"] },
            "strategy": { "kind": "ols_pairs", "y": "AREX", "x": "WLL",
                          "ols_window": 100, "zscore_low": 0.5, "zscore_high": 3.0 }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.portfolio.initial_capital, 100_000.0);
        assert_eq!(config.data.symbols.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_file_defers_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{ "portfolio": { "initial_capital": 5000.0 } }"#).unwrap();

        let mut config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.portfolio.initial_capital, 5000.0);
        assert!(config.validate().is_err());

        config.data.symbols = vec!["SPY".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_json_file(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::from_json_file(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_pair_leg_must_be_configured() {
        let mut config = valid_config();
        config.strategy = StrategyConfig::OlsPairs {
            y: "AAPL".to_string(),
            x: "MSFT".to_string(),
            ols_window: 50,
            zscore_low: 0.5,
            zscore_high: 3.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_order_checked() {
        let mut config = valid_config();
        config.strategy = StrategyConfig::MovingAverageCross {
            short_window: 50,
            long_window: 20,
        };
        assert!(config.validate().is_err());
    }
}
