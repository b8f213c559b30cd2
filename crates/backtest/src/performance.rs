//! Backtest performance statistics.
//!
//! Everything here is a pure function of the holdings history, so a report
//! can be recomputed any number of times with identical results.

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::portfolio::HoldingsSnapshot;
use replay_core::Timestamp;

/// One bar of the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityRow {
    pub ts: Timestamp,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
    /// Per-instrument market value.
    pub values: Vec<f64>,
    /// Period return against the previous total.
    pub returns: f64,
    /// Cumulative growth of one unit of capital.
    pub equity: f64,
    /// Fractional drawdown from the running high-water mark.
    pub drawdown: f64,
}

/// Equity curve built from a holdings history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EquityCurve {
    rows: Vec<EquityRow>,
    max_drawdown: f64,
    drawdown_duration: usize,
}

impl EquityCurve {
    /// Build the curve. The first return is measured against `initial_capital`.
    pub fn from_holdings(history: &[HoldingsSnapshot], initial_capital: f64) -> Self {
        let mut rows = Vec::with_capacity(history.len());
        let mut previous = initial_capital;
        let mut equity = 1.0;

        for snapshot in history {
            let returns = snapshot.total / previous - 1.0;
            equity *= 1.0 + returns;
            previous = snapshot.total;

            rows.push(EquityRow {
                ts: snapshot.ts,
                cash: snapshot.cash,
                commission: snapshot.commission,
                total: snapshot.total,
                values: snapshot.values.clone(),
                returns,
                equity,
                drawdown: 0.0,
            });
        }

        let equity: Vec<f64> = rows.iter().map(|r| r.equity).collect();
        let (series, max_drawdown, drawdown_duration) = drawdowns(&equity);
        for (row, dd) in rows.iter_mut().zip(series) {
            row.drawdown = dd;
        }

        Self {
            rows,
            max_drawdown,
            drawdown_duration,
        }
    }

    pub fn rows(&self) -> &[EquityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.returns).collect()
    }

    pub fn equity(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.equity).collect()
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    /// Longest run of consecutive bars spent below the high-water mark.
    pub fn drawdown_duration(&self) -> usize {
        self.drawdown_duration
    }
}

/// Annualised Sharpe ratio with a zero risk-free rate.
///
/// Uses the population standard deviation. NaN with fewer than two returns
/// or zero variance.
pub fn sharpe_ratio(returns: &[f64], periods: u32) -> f64 {
    if returns.len() < 2 {
        return f64::NAN;
    }
    let mean = returns.iter().mean();
    let std_dev = returns.iter().population_std_dev();
    if std_dev.is_nan() || std_dev <= 0.0 {
        return f64::NAN;
    }
    (periods as f64).sqrt() * mean / std_dev
}

/// Drawdown series, maximum drawdown and maximum duration for `equity`.
///
/// The high-water mark starts at zero; drawdown is 0 while the mark is 0.
/// The duration counter resets whenever drawdown returns to zero.
pub fn drawdowns(equity: &[f64]) -> (Vec<f64>, f64, usize) {
    let mut series = Vec::with_capacity(equity.len());
    let mut hwm = 0.0_f64;
    let mut duration = 0usize;
    let mut max_drawdown = 0.0_f64;
    let mut max_duration = 0usize;

    for &value in equity {
        hwm = hwm.max(value);
        let dd = if hwm > 0.0 { (hwm - value) / hwm } else { 0.0 };
        duration = if dd > 0.0 { duration + 1 } else { 0 };

        max_drawdown = max_drawdown.max(dd);
        max_duration = max_duration.max(duration);
        series.push(dd);
    }

    (series, max_drawdown, max_duration)
}

/// Summary statistics for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// Final equity minus one.
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Bars.
    pub drawdown_duration: usize,
}

impl PerformanceReport {
    pub fn compute(curve: &EquityCurve, periods_per_year: u32) -> Self {
        let total_return = curve
            .rows()
            .last()
            .map(|r| r.equity - 1.0)
            .unwrap_or(f64::NAN);

        Self {
            total_return,
            sharpe_ratio: sharpe_ratio(&curve.returns(), periods_per_year),
            max_drawdown: curve.max_drawdown(),
            drawdown_duration: curve.drawdown_duration(),
        }
    }

    /// Ordered (label, formatted value) pairs.
    pub fn summary(&self) -> Vec<(String, String)> {
        vec![
            (
                "Total Return".to_string(),
                format!("{:.2}%", self.total_return * 100.0),
            ),
            ("Sharpe Ratio".to_string(), format!("{:.2}", self.sharpe_ratio)),
            (
                "Max Drawdown".to_string(),
                format!("{:.2}%", self.max_drawdown * 100.0),
            ),
            (
                "Drawdown Duration".to_string(),
                self.drawdown_duration.to_string(),
            ),
        ]
    }
}
