//! Reference strategies for the replay-trader system.
//!
//! This crate provides:
//! - Window statistics (mean, OLS hedge ratio, z-score)
//! - Moving-average crossover
//! - OLS pairs mean reversion
//! - Construction of a strategy from configuration

pub mod factory;
pub mod moving_average;
pub mod ols_pairs;
pub mod stats;

pub use factory::build_strategy;
pub use moving_average::MovingAverageCross;
pub use ols_pairs::OlsPairs;
