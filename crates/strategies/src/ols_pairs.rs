//! Pairs mean reversion on a rolling OLS hedge ratio.
//!
//! Each bar the hedge ratio of `y` on `x` is re-estimated over the last
//! `ols_window` closes, and the z-score of the latest spread residual drives
//! entries (|z| >= high) and exits (|z| <= low). Both legs are always
//! signalled together in the same bar.

use replay_core::{
    BarSource, Direction, MarketEvent, PriceField, Result, SignalEvent, SignalSink, Strategy,
};
use tracing::debug;

use crate::stats::{last_zscore, ols_slope, spread};

/// Which side of the spread is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadExposure {
    Flat,
    /// Long y, short x.
    LongSpread,
    /// Short y, long x.
    ShortSpread,
}

/// OLS pairs mean reversion strategy.
pub struct OlsPairs {
    strategy_id: u32,
    y: String,
    x: String,
    ols_window: usize,
    zscore_low: f64,
    zscore_high: f64,
    field: PriceField,
    exposure: SpreadExposure,
    hedge_ratio: Option<f64>,
}

impl OlsPairs {
    pub fn new(
        y: impl Into<String>,
        x: impl Into<String>,
        ols_window: usize,
        zscore_low: f64,
        zscore_high: f64,
    ) -> Self {
        Self {
            strategy_id: 1,
            y: y.into(),
            x: x.into(),
            ols_window,
            zscore_low,
            zscore_high,
            field: PriceField::Close,
            exposure: SpreadExposure::Flat,
            hedge_ratio: None,
        }
    }

    pub fn exposure(&self) -> SpreadExposure {
        self.exposure
    }

    /// Hedge ratio from the most recent full window.
    pub fn hedge_ratio(&self) -> Option<f64> {
        self.hedge_ratio
    }

    /// Decide the (y, x) leg directions and the x-leg strength for `zscore`.
    fn decide(&self, zscore: f64, hedge: f64) -> Option<(Direction, Direction, f64, SpreadExposure)> {
        match self.exposure {
            SpreadExposure::Flat if zscore <= -self.zscore_high => Some((
                Direction::Long,
                Direction::Short,
                hedge,
                SpreadExposure::LongSpread,
            )),
            SpreadExposure::Flat if zscore >= self.zscore_high => Some((
                Direction::Short,
                Direction::Long,
                hedge,
                SpreadExposure::ShortSpread,
            )),
            SpreadExposure::LongSpread | SpreadExposure::ShortSpread
                if zscore.abs() <= self.zscore_low =>
            {
                Some((Direction::Exit, Direction::Exit, 1.0, SpreadExposure::Flat))
            }
            _ => None,
        }
    }
}

impl Strategy for OlsPairs {
    fn name(&self) -> &str {
        "ols_pairs"
    }

    fn on_market(
        &mut self,
        event: &MarketEvent,
        bars: &dyn BarSource,
        signals: &mut SignalSink<'_>,
    ) -> Result<()> {
        let y = bars.latest_values(&self.y, self.field, self.ols_window)?;
        let x = bars.latest_values(&self.x, self.field, self.ols_window)?;
        if y.len() < self.ols_window || x.len() < self.ols_window {
            return Ok(());
        }

        let Some(hedge_ratio) = ols_slope(&y, &x) else {
            return Ok(());
        };
        self.hedge_ratio = Some(hedge_ratio);

        let Some(zscore) = last_zscore(&spread(&y, &x, hedge_ratio)) else {
            return Ok(());
        };

        let hedge = hedge_ratio.abs();
        if hedge <= 0.0 {
            return Ok(());
        }

        let Some((y_dir, x_dir, x_strength, next)) = self.decide(zscore, hedge) else {
            return Ok(());
        };

        debug!(zscore, hedge_ratio, ?y_dir, ?x_dir, ts = %event.ts, "pair signal");
        let y_signal = SignalEvent::new(self.strategy_id, self.y.as_str(), event.ts, y_dir, 1.0)?;
        let x_signal = SignalEvent::new(self.strategy_id, self.x.as_str(), event.ts, x_dir, x_strength)?;
        signals.emit(y_signal);
        signals.emit(x_signal);
        self.exposure = next;
        Ok(())
    }

    fn reset(&mut self) {
        self.exposure = SpreadExposure::Flat;
        self.hedge_ratio = None;
    }
}
