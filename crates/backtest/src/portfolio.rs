//! Portfolio bookkeeping for backtesting.
//!
//! Tracks the position ledger, cash, cumulative commission and a per-bar
//! history of holdings and positions.
//!
//! Mutation rights:
//! - positions, cash and commission change only in [`Portfolio::on_fill`]
//! - per-instrument market values change only in [`Portfolio::on_market`]
//!   and [`Portfolio::finalize`]

use std::collections::HashMap;

use replay_core::config::PortfolioConfig;
use replay_core::{
    BarSource, Error, FillEvent, MarketEvent, OrderEvent, PriceField, Quantity, Result, SignalEvent,
    Timestamp,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::sizing::{NaiveSizer, OrderSizer};

/// Holdings at one bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingsSnapshot {
    /// Bar timestamp.
    pub ts: Timestamp,
    /// Cash balance.
    pub cash: f64,
    /// Commission paid since the start of the run.
    pub commission: f64,
    /// Cash plus marked value of all positions.
    pub total: f64,
    /// Marked value per instrument, in [`Portfolio::symbols`] order.
    pub values: Vec<f64>,
}

/// Positions at the end of one bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSnapshot {
    /// Bar timestamp.
    pub ts: Timestamp,
    /// Signed quantity per instrument, in [`Portfolio::symbols`] order.
    pub quantities: Vec<Quantity>,
}

/// Position ledger and holdings history for one run.
pub struct Portfolio {
    symbols: Vec<String>,
    index: HashMap<String, usize>,
    initial_capital: f64,
    mark_field: PriceField,
    sizer: Box<dyn OrderSizer>,
    /// Signed quantity per instrument.
    positions: Vec<Quantity>,
    /// Last mark price per instrument.
    marks: Vec<f64>,
    cash: f64,
    commission: f64,
    holdings: Vec<HoldingsSnapshot>,
    position_history: Vec<PositionSnapshot>,
}

impl Portfolio {
    /// Create a flat portfolio over `symbols` with the default naive sizer.
    pub fn new(symbols: Vec<String>, initial_capital: f64) -> Self {
        let index = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let n = symbols.len();

        Self {
            symbols,
            index,
            initial_capital,
            mark_field: PriceField::AdjClose,
            sizer: Box::new(NaiveSizer::default()),
            positions: vec![0; n],
            marks: vec![0.0; n],
            cash: initial_capital,
            commission: 0.0,
            holdings: Vec::new(),
            position_history: Vec::new(),
        }
    }

    /// Create a portfolio from configuration.
    pub fn from_config(symbols: Vec<String>, config: &PortfolioConfig) -> Self {
        Self::new(symbols, config.initial_capital)
            .with_sizer(NaiveSizer::new(config.lot_size))
            .with_mark_field(config.mark_field)
    }

    /// Replace the sizing policy.
    pub fn with_sizer(mut self, sizer: impl OrderSizer + 'static) -> Self {
        self.sizer = Box::new(sizer);
        self
    }

    /// Mark positions using a different bar field.
    pub fn with_mark_field(mut self, field: PriceField) -> Self {
        self.mark_field = field;
        self
    }

    /// Tracked instruments.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Commission paid so far.
    pub fn total_commission(&self) -> f64 {
        self.commission
    }

    /// Current signed quantity for `symbol`.
    pub fn position(&self, symbol: &str) -> Result<Quantity> {
        Ok(self.positions[self.slot(symbol)?])
    }

    /// Current ledger as (symbol, quantity) pairs.
    pub fn positions(&self) -> impl Iterator<Item = (&str, Quantity)> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter().copied())
    }

    /// One snapshot per market event seen.
    pub fn holdings(&self) -> &[HoldingsSnapshot] {
        &self.holdings
    }

    /// End-of-bar positions, one per market event seen.
    pub fn position_history(&self) -> &[PositionSnapshot] {
        &self.position_history
    }

    /// Snapshot of the bar in progress.
    pub fn current_holdings(&self) -> Option<&HoldingsSnapshot> {
        self.holdings.last()
    }

    /// Cash plus positions at their latest marks.
    pub fn total_value(&self) -> f64 {
        self.cash + self.marked_positions()
    }

    fn slot(&self, symbol: &str) -> Result<usize> {
        self.index
            .get(symbol)
            .copied()
            .ok_or_else(|| Error::unknown_instrument(symbol))
    }

    fn marked_positions(&self) -> f64 {
        self.positions
            .iter()
            .zip(&self.marks)
            .map(|(&q, &price)| q as f64 * price)
            .sum()
    }

    fn refresh_marks(&mut self, bars: &dyn BarSource) -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(self.symbols.len());
        for (i, symbol) in self.symbols.iter().enumerate() {
            let price = bars.latest_price(symbol, self.mark_field)?;
            self.marks[i] = price;
            values.push(self.positions[i] as f64 * price);
        }
        Ok(values)
    }

    /// Mark every position to market and open a snapshot for this bar.
    ///
    /// Cash and commission are carried over; the ledger is not touched.
    pub fn on_market(&mut self, event: &MarketEvent, bars: &dyn BarSource) -> Result<()> {
        let values = self.refresh_marks(bars)?;
        let total = self.cash + values.iter().sum::<f64>();

        trace!(bar = event.bar_index, total, "mark to market");

        self.holdings.push(HoldingsSnapshot {
            ts: event.ts,
            cash: self.cash,
            commission: self.commission,
            total,
            values,
        });
        self.position_history.push(PositionSnapshot {
            ts: event.ts,
            quantities: self.positions.clone(),
        });
        Ok(())
    }

    /// Ask the sizing policy for an order. Never changes the ledger.
    pub fn on_signal(&self, signal: &SignalEvent) -> Result<Option<OrderEvent>> {
        let current = self.position(signal.symbol())?;
        let order = self.sizer.size(signal, current)?;
        debug!(
            symbol = signal.symbol(),
            direction = ?signal.direction(),
            current,
            order = ?order.as_ref().map(|o| (o.side(), o.quantity())),
            "signal"
        );
        Ok(order)
    }

    /// Apply a fill to the ledger, cash and the current snapshot.
    pub fn on_fill(&mut self, fill: &FillEvent) -> Result<()> {
        let slot = self.slot(fill.symbol())?;
        if self.holdings.is_empty() {
            return Err(Error::config(format!(
                "fill for {} arrived before any market event",
                fill.symbol()
            )));
        }

        self.positions[slot] += fill.signed_quantity();
        self.cash -= fill.cash_outflow();
        self.commission += fill.commission();
        let total = self.total_value();

        if let Some(current) = self.holdings.last_mut() {
            current.cash = self.cash;
            current.commission = self.commission;
            current.total = total;
        }
        if let Some(current) = self.position_history.last_mut() {
            current.quantities[slot] = self.positions[slot];
        }

        debug!(
            symbol = fill.symbol(),
            side = ?fill.side(),
            quantity = fill.quantity(),
            price = fill.fill_cost(),
            commission = fill.commission(),
            position = self.positions[slot],
            cash = self.cash,
            "fill applied"
        );
        Ok(())
    }

    /// Re-mark the last snapshot in place with the latest prices.
    ///
    /// Called once when the bar source is exhausted. No snapshot is added.
    pub fn finalize(&mut self, bars: &dyn BarSource) -> Result<()> {
        if self.holdings.is_empty() {
            return Ok(());
        }
        let values = self.refresh_marks(bars)?;
        let total = self.cash + values.iter().sum::<f64>();
        if let Some(current) = self.holdings.last_mut() {
            current.values = values;
            current.total = total;
        }
        Ok(())
    }
}
