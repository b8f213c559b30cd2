//! Historic replay bar source.

use std::collections::HashMap;

use replay_core::{Bar, BarSource, Error, Result, Timestamp};

use crate::calendar::align_series;

/// Replays pre-loaded, calendar-aligned bars one step at a time.
///
/// All instruments share one cursor: after `k` advances, each instrument
/// exposes its first `k` bars.
#[derive(Debug, Clone)]
pub struct HistoricBarSource {
    symbols: Vec<String>,
    calendar: Vec<Timestamp>,
    series: HashMap<String, Vec<Bar>>,
    /// Number of bars released so far.
    cursor: usize,
}

impl HistoricBarSource {
    /// Build a source from raw per-instrument bars (any order, gaps allowed).
    pub fn from_series(series: Vec<(String, Vec<Bar>)>) -> Result<Self> {
        let mut symbols = Vec::with_capacity(series.len());
        for (symbol, _) in &series {
            if symbols.contains(symbol) {
                return Err(Error::config(format!("duplicate instrument {symbol}")));
            }
            symbols.push(symbol.clone());
        }

        let (calendar, aligned) = align_series(series)?;

        Ok(Self {
            symbols,
            calendar,
            series: aligned.into_iter().collect(),
            cursor: 0,
        })
    }

    /// The aligned calendar.
    pub fn calendar(&self) -> &[Timestamp] {
        &self.calendar
    }

    /// Whether every bar has been released.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.calendar.len()
    }

    fn released(&self, symbol: &str) -> Result<&[Bar]> {
        self.series
            .get(symbol)
            .map(|bars| &bars[..self.cursor])
            .ok_or_else(|| Error::unknown_instrument(symbol))
    }
}

impl BarSource for HistoricBarSource {
    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn latest_bar(&self, symbol: &str) -> Result<Option<&Bar>> {
        Ok(self.released(symbol)?.last())
    }

    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar]> {
        let bars = self.released(symbol)?;
        Ok(&bars[bars.len().saturating_sub(n)..])
    }

    fn latest_timestamp(&self) -> Option<Timestamp> {
        self.cursor.checked_sub(1).map(|i| self.calendar[i])
    }

    fn advance(&mut self) -> Result<bool> {
        if self.is_exhausted() {
            return Ok(false);
        }
        self.cursor += 1;
        Ok(true)
    }
}
