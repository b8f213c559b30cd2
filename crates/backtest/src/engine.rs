//! Event-driven backtest engine.
//!
//! One Market event per bar, then the queue is drained until empty before
//! the bar source is advanced again:
//!
//! ```text
//! Market -> Strategy (signals) + Portfolio (mark to market)
//! Signal -> Portfolio sizing -> Order
//! Order  -> Execution venue  -> Fill
//! Fill   -> Portfolio ledger
//! ```
//!
//! Any dispatch error aborts the run.

use std::time::Duration;

use replay_core::config::BacktestConfig;
use replay_core::{
    BarSource, Error, Event, EventKind, EventQueue, MarketEvent, Result, SignalSink, Strategy,
    Timestamp,
};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::execution::ExecutionVenue;
use crate::performance::{EquityCurve, PerformanceReport};
use crate::portfolio::Portfolio;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pause after each bar's cascade. Zero disables it.
    pub heartbeat: Duration,
    /// Annualization factor for the Sharpe ratio.
    pub periods_per_year: u32,
    /// Keep a record of every dispatched event.
    pub record_dispatch_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heartbeat: Duration::ZERO,
            periods_per_year: 252,
            record_dispatch_log: false,
        }
    }
}

impl From<&BacktestConfig> for EngineConfig {
    fn from(config: &BacktestConfig) -> Self {
        Self {
            heartbeat: Duration::from_millis(config.heartbeat_ms),
            periods_per_year: config.periods_per_year,
            record_dispatch_log: false,
        }
    }
}

/// What the engine is currently dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnginePhase {
    AwaitingBar,
    CascadeSignals,
    CascadeOrders,
    CascadeFills,
    Finalize,
    Failed,
}

/// Event counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub bars: usize,
    pub signals: usize,
    pub orders: usize,
    pub fills: usize,
}

/// One dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchRecord {
    pub bar_index: usize,
    pub kind: EventKind,
    pub phase: EnginePhase,
}

/// Result of a completed run.
pub struct BacktestOutcome {
    /// Final portfolio, including its holdings and positions history.
    pub portfolio: Portfolio,
    pub curve: EquityCurve,
    pub report: PerformanceReport,
    pub stats: RunStats,
    /// Empty unless [`EngineConfig::record_dispatch_log`] is set.
    pub dispatch_log: Vec<DispatchRecord>,
}

impl BacktestOutcome {
    pub fn summary(&self) -> Vec<(String, String)> {
        self.report.summary()
    }
}

/// A single backtest run over one bar source, strategy and venue.
pub struct Backtest<S, T, V> {
    source: S,
    strategy: T,
    venue: V,
    portfolio: Portfolio,
    config: EngineConfig,
    queue: EventQueue,
    phase: EnginePhase,
    stats: RunStats,
    dispatch_log: Vec<DispatchRecord>,
    last_completed_bar: Option<usize>,
}

impl<S, T, V> Backtest<S, T, V>
where
    S: BarSource,
    T: Strategy,
    V: ExecutionVenue,
{
    pub fn new(source: S, strategy: T, venue: V, portfolio: Portfolio) -> Self {
        Self {
            source,
            strategy,
            venue,
            portfolio,
            config: EngineConfig::default(),
            queue: EventQueue::new(),
            phase: EnginePhase::AwaitingBar,
            stats: RunStats::default(),
            dispatch_log: Vec::new(),
            last_completed_bar: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Run to exhaustion of the bar source.
    ///
    /// Consumes the engine; a failed run reports
    /// [`Error::RunAborted`] with the last fully processed bar.
    pub fn run(mut self) -> Result<BacktestOutcome> {
        if let Some(missing) = self
            .portfolio
            .symbols()
            .iter()
            .find(|s| !self.source.tracks(s))
        {
            return Err(Error::config(format!(
                "portfolio instrument {missing} is not provided by the bar source"
            )));
        }

        info!(
            strategy = self.strategy.name(),
            symbols = ?self.source.symbols(),
            capital = self.portfolio.initial_capital(),
            "backtest starting"
        );
        self.strategy.reset();

        let mut bar_index = 0usize;
        loop {
            self.phase = EnginePhase::AwaitingBar;
            match self.source.advance() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => return Err(self.abort(e)),
            }

            let Some(ts) = self.source.latest_timestamp() else {
                let e = Error::data("bar source advanced without a timestamp");
                return Err(self.abort(e));
            };

            self.queue.push(Event::Market(MarketEvent { ts, bar_index }));
            if let Err(e) = self.drain(bar_index, ts) {
                return Err(self.abort(e));
            }

            self.last_completed_bar = Some(bar_index);
            self.stats.bars += 1;
            bar_index += 1;

            if !self.config.heartbeat.is_zero() {
                std::thread::sleep(self.config.heartbeat);
            }
        }

        self.phase = EnginePhase::Finalize;
        if let Err(e) = self.portfolio.finalize(&self.source) {
            return Err(self.abort(e));
        }

        let curve = EquityCurve::from_holdings(
            self.portfolio.holdings(),
            self.portfolio.initial_capital(),
        );
        let report = PerformanceReport::compute(&curve, self.config.periods_per_year);

        info!(
            bars = self.stats.bars,
            signals = self.stats.signals,
            orders = self.stats.orders,
            fills = self.stats.fills,
            total_return = report.total_return,
            sharpe = report.sharpe_ratio,
            max_drawdown = report.max_drawdown,
            "backtest finished"
        );

        Ok(BacktestOutcome {
            portfolio: self.portfolio,
            curve,
            report,
            stats: self.stats,
            dispatch_log: self.dispatch_log,
        })
    }

    /// Dispatch until the queue is empty.
    fn drain(&mut self, bar_index: usize, now: Timestamp) -> Result<()> {
        while let Some(event) = self.queue.pop() {
            let kind = event.kind();
            self.phase = match kind {
                EventKind::Market | EventKind::Signal => EnginePhase::CascadeSignals,
                EventKind::Order => EnginePhase::CascadeOrders,
                EventKind::Fill => EnginePhase::CascadeFills,
            };
            trace!(bar_index, ?kind, "dispatch");
            if self.config.record_dispatch_log {
                self.dispatch_log.push(DispatchRecord {
                    bar_index,
                    kind,
                    phase: self.phase,
                });
            }

            match event {
                Event::Market(market) => {
                    let mut sink = SignalSink::new(&mut self.queue);
                    self.strategy.on_market(&market, &self.source, &mut sink)?;
                    self.portfolio.on_market(&market, &self.source)?;
                }
                Event::Signal(signal) => {
                    self.stats.signals += 1;
                    if !self.source.tracks(signal.symbol()) {
                        return Err(Error::unknown_instrument(signal.symbol()));
                    }
                    if let Some(order) = self.portfolio.on_signal(&signal)? {
                        self.queue.push(Event::Order(order));
                    }
                }
                Event::Order(order) => {
                    self.stats.orders += 1;
                    let fill = self.venue.execute(&order, &self.source, now)?;
                    self.queue.push(Event::Fill(fill));
                }
                Event::Fill(fill) => {
                    self.stats.fills += 1;
                    self.portfolio.on_fill(&fill)?;
                }
            }
        }
        Ok(())
    }

    fn abort(&mut self, source: Error) -> Error {
        self.phase = EnginePhase::Failed;
        self.queue.clear();
        warn!(
            last_completed_bar = ?self.last_completed_bar,
            error = %source,
            "backtest aborted"
        );
        debug!(stats = ?self.stats, "counts at abort");
        Error::run_aborted(self.last_completed_bar, source)
    }
}
