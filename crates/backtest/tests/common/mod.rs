//! Shared fixtures for the backtest integration tests.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use replay_backtest::{Backtest, EngineConfig, Portfolio, SimulatedVenue};
use replay_core::{
    Bar, BarSource, Direction, MarketEvent, Result, SignalEvent, SignalSink, Strategy,
};
use replay_ingestion::HistoricBarSource;

pub fn bars(closes: &[f64]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            ts: start + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
            adj_close: close,
        })
        .collect()
}

/// One instrument at a constant price.
pub fn flat_source(symbol: &str, n: usize, price: f64) -> HistoricBarSource {
    HistoricBarSource::from_series(vec![(symbol.to_string(), bars(&vec![price; n]))]).unwrap()
}

pub fn source(series: &[(&str, Vec<f64>)]) -> HistoricBarSource {
    HistoricBarSource::from_series(
        series
            .iter()
            .map(|(symbol, closes)| (symbol.to_string(), bars(closes)))
            .collect(),
    )
    .unwrap()
}

/// Emits predetermined signals at given bar indices.
pub struct Scripted {
    script: Vec<(usize, String, Direction)>,
}

impl Scripted {
    pub fn new(script: &[(usize, &str, Direction)]) -> Self {
        Self {
            script: script
                .iter()
                .map(|(bar, symbol, direction)| (*bar, symbol.to_string(), *direction))
                .collect(),
        }
    }
}

impl Strategy for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn on_market(
        &mut self,
        event: &MarketEvent,
        _bars: &dyn BarSource,
        signals: &mut SignalSink<'_>,
    ) -> Result<()> {
        for (bar, symbol, direction) in &self.script {
            if *bar == event.bar_index {
                signals.emit(SignalEvent::new(7, symbol.as_str(), event.ts, *direction, 1.0)?);
            }
        }
        Ok(())
    }
}

pub fn zero_commission_venue() -> SimulatedVenue {
    SimulatedVenue::new("SIM").with_commission(|_: u64, _: f64| 0.0)
}

/// Engine over `source` with the dispatch log enabled.
pub fn engine(
    source: HistoricBarSource,
    script: &[(usize, &str, Direction)],
    venue: SimulatedVenue,
    capital: f64,
) -> Backtest<HistoricBarSource, Scripted, SimulatedVenue> {
    let portfolio = Portfolio::new(source.symbols().to_vec(), capital);
    Backtest::new(source, Scripted::new(script), venue, portfolio).with_config(EngineConfig {
        record_dispatch_log: true,
        ..Default::default()
    })
}
