//! Backtesting engine for the replay-trader system.
//!
//! This crate provides:
//! - The event-driven simulation loop
//! - Portfolio bookkeeping and order sizing
//! - Simulated execution with tiered commission
//! - Equity curve, Sharpe ratio and drawdown statistics

pub mod engine;
pub mod execution;
pub mod performance;
pub mod portfolio;
pub mod report;
pub mod sizing;

pub use engine::{Backtest, BacktestOutcome, DispatchRecord, EngineConfig, EnginePhase, RunStats};
pub use execution::{CommissionModel, ExecutionVenue, SimulatedVenue, TieredCommission};
pub use performance::{drawdowns, sharpe_ratio, EquityCurve, EquityRow, PerformanceReport};
pub use portfolio::{HoldingsSnapshot, Portfolio, PositionSnapshot};
pub use report::{write_equity, write_equity_csv};
pub use sizing::{NaiveSizer, OrderSizer};
