//! Strategy construction from configuration.

use replay_core::config::StrategyConfig;
use replay_core::Strategy;

use crate::moving_average::MovingAverageCross;
use crate::ols_pairs::OlsPairs;

/// Build the configured strategy over `symbols`.
pub fn build_strategy(config: &StrategyConfig, symbols: &[String]) -> Box<dyn Strategy> {
    match config {
        StrategyConfig::MovingAverageCross {
            short_window,
            long_window,
        } => Box::new(MovingAverageCross::new(symbols.to_vec(), *short_window, *long_window)),
        StrategyConfig::OlsPairs {
            y,
            x,
            ols_window,
            zscore_low,
            zscore_high,
        } => Box::new(OlsPairs::new(
            y.as_str(),
            x.as_str(),
            *ols_window,
            *zscore_low,
            *zscore_high,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_default() {
        let strategy = build_strategy(&StrategyConfig::default(), &["SPY".to_string()]);
        assert_eq!(strategy.name(), "moving_average_cross");
    }

    #[test]
    fn test_build_pairs() {
        let config = StrategyConfig::OlsPairs {
            y: "AREX".to_string(),
            x: "WLL".to_string(),
            ols_window: 100,
            zscore_low: 0.5,
            zscore_high: 3.0,
        };
        let strategy = build_strategy(&config, &[]);
        assert_eq!(strategy.name(), "ols_pairs");
    }
}
