//! Bar source contract consumed by the engine, strategies and portfolio.

use crate::error::{Error, Result};
use crate::types::{Bar, PriceField, Timestamp};

/// Supplies sequential bars per instrument, aligned to a common calendar.
///
/// The historic replay in `replay-ingestion` is the shipped implementation;
/// a live feed would implement the same trait.
pub trait BarSource {
    /// Instruments tracked by this source, in a stable order.
    fn symbols(&self) -> &[String];

    /// Whether `symbol` is tracked.
    fn tracks(&self, symbol: &str) -> bool {
        self.symbols().iter().any(|s| s == symbol)
    }

    /// Most recent bar, or `None` before the first advance.
    fn latest_bar(&self, symbol: &str) -> Result<Option<&Bar>>;

    /// Up to `n` most recent bars, oldest first. Shorter when less history
    /// has been observed; empty before the first advance.
    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar]>;

    /// Timestamp of the current bar.
    fn latest_timestamp(&self) -> Option<Timestamp>;

    /// Advance every instrument by one bar. Returns `false` once exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// A field of the most recent bar.
    fn latest_price(&self, symbol: &str, field: PriceField) -> Result<f64> {
        self.latest_bar(symbol)?
            .map(|bar| bar.value(field))
            .ok_or_else(|| Error::data(format!("no bar observed yet for {symbol}")))
    }

    /// A field of up to `n` most recent bars, oldest first.
    fn latest_values(&self, symbol: &str, field: PriceField, n: usize) -> Result<Vec<f64>> {
        Ok(self
            .latest_bars(symbol, n)?
            .iter()
            .map(|bar| bar.value(field))
            .collect())
    }
}
