//! Moving-average crossover strategy.
//!
//! Goes long when the short simple moving average rises above the long one
//! and exits when it falls back below. Never shorts.

use std::collections::HashMap;

use replay_core::{
    BarSource, Direction, MarketEvent, PriceField, Result, SignalEvent, SignalSink, Strategy,
};
use tracing::debug;

use crate::stats::mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exposure {
    Out,
    Long,
}

/// Short/long SMA crossover over one or more instruments.
pub struct MovingAverageCross {
    strategy_id: u32,
    symbols: Vec<String>,
    short_window: usize,
    long_window: usize,
    field: PriceField,
    exposure: HashMap<String, Exposure>,
}

impl MovingAverageCross {
    /// Create a crossover strategy on `symbols`.
    pub fn new(symbols: Vec<String>, short_window: usize, long_window: usize) -> Self {
        let exposure = symbols.iter().map(|s| (s.clone(), Exposure::Out)).collect();
        Self {
            strategy_id: 1,
            symbols,
            short_window,
            long_window,
            field: PriceField::AdjClose,
            exposure,
        }
    }

    /// Whether the strategy currently considers `symbol` held.
    pub fn is_long(&self, symbol: &str) -> bool {
        self.exposure.get(symbol) == Some(&Exposure::Long)
    }
}

impl Strategy for MovingAverageCross {
    fn name(&self) -> &str {
        "moving_average_cross"
    }

    fn on_market(
        &mut self,
        event: &MarketEvent,
        bars: &dyn BarSource,
        signals: &mut SignalSink<'_>,
    ) -> Result<()> {
        for symbol in &self.symbols {
            let window = bars.latest_values(symbol, self.field, self.long_window)?;
            if window.len() < self.long_window {
                continue;
            }

            let (Some(short_sma), Some(long_sma)) = (
                mean(&window[window.len().saturating_sub(self.short_window)..]),
                mean(&window),
            ) else {
                continue;
            };

            let exposure = self.exposure.entry(symbol.clone()).or_insert(Exposure::Out);
            let direction = match *exposure {
                Exposure::Out if short_sma > long_sma => {
                    *exposure = Exposure::Long;
                    Direction::Long
                }
                Exposure::Long if short_sma < long_sma => {
                    *exposure = Exposure::Out;
                    Direction::Exit
                }
                _ => continue,
            };

            debug!(%symbol, ?direction, short_sma, long_sma, ts = %event.ts, "crossover");
            signals.emit(SignalEvent::new(
                self.strategy_id,
                symbol.as_str(),
                event.ts,
                direction,
                1.0,
            )?);
        }
        Ok(())
    }

    fn reset(&mut self) {
        for exposure in self.exposure.values_mut() {
            *exposure = Exposure::Out;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use replay_core::{Bar, Event, EventQueue};
    use replay_ingestion::HistoricBarSource;

    fn make_source(closes: &[f64]) -> HistoricBarSource {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                ts: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
                adj_close: close,
            })
            .collect();
        HistoricBarSource::from_series(vec![("SPY".to_string(), bars)]).unwrap()
    }

    /// Replay every bar and collect (bar index, direction) of emitted signals.
    fn replay(strategy: &mut MovingAverageCross, source: &mut HistoricBarSource) -> Vec<(usize, Direction)> {
        let mut out = Vec::new();
        let mut queue = EventQueue::new();
        let mut bar_index = 0;
        while source.advance().unwrap() {
            let event = MarketEvent {
                ts: source.latest_timestamp().unwrap(),
                bar_index,
            };
            strategy
                .on_market(&event, &*source, &mut SignalSink::new(&mut queue))
                .unwrap();
            while let Some(Event::Signal(signal)) = queue.pop() {
                out.push((bar_index, signal.direction()));
            }
            bar_index += 1;
        }
        out
    }

    #[test]
    fn test_no_signal_without_full_window() {
        let mut strategy = MovingAverageCross::new(vec!["SPY".to_string()], 2, 5);
        let mut source = make_source(&[1.0, 2.0, 3.0, 4.0]);
        assert!(replay(&mut strategy, &mut source).is_empty());
    }

    #[test]
    fn test_long_then_exit() {
        let mut strategy = MovingAverageCross::new(vec!["SPY".to_string()], 2, 4);
        // Rising, then falling
        let closes = [10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 14.0, 9.0, 6.0, 5.0];
        let mut source = make_source(&closes);

        let signals = replay(&mut strategy, &mut source);

        assert_eq!(signals, vec![(4, Direction::Long), (7, Direction::Exit)]);
        assert!(!strategy.is_long("SPY"));
    }

    #[test]
    fn test_reset_clears_exposure() {
        let mut strategy = MovingAverageCross::new(vec!["SPY".to_string()], 1, 2);
        let mut source = make_source(&[1.0, 2.0]);
        replay(&mut strategy, &mut source);
        assert!(strategy.is_long("SPY"));

        strategy.reset();
        assert!(!strategy.is_long("SPY"));
    }

    #[test]
    fn test_unknown_symbol_propagates() {
        let mut strategy = MovingAverageCross::new(vec!["QQQ".to_string()], 1, 2);
        let mut source = make_source(&[1.0, 2.0]);
        source.advance().unwrap();
        let event = MarketEvent {
            ts: source.latest_timestamp().unwrap(),
            bar_index: 0,
        };
        let mut queue = EventQueue::new();
        let result = strategy.on_market(&event, &source, &mut SignalSink::new(&mut queue));
        assert!(result.is_err());
    }
}
