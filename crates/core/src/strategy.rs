//! Strategy contract.

use crate::error::Result;
use crate::event::MarketEvent;
use crate::queue::SignalSink;
use crate::source::BarSource;

/// A signal-generating policy.
///
/// Called once per market event. Implementations read history only through
/// the bar source's bounded windows and must be deterministic in the bars
/// observed so far: signal timestamps come from `event.ts`, never from the
/// wall clock. A window shorter than required means "no signal this bar".
pub trait Strategy {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Evaluate the latest bars and emit zero or more signals.
    fn on_market(
        &mut self,
        event: &MarketEvent,
        bars: &dyn BarSource,
        signals: &mut SignalSink<'_>,
    ) -> Result<()>;

    /// Clear per-run state. Called by the engine at run start.
    fn reset(&mut self) {}
}

impl<T: Strategy + ?Sized> Strategy for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_market(
        &mut self,
        event: &MarketEvent,
        bars: &dyn BarSource,
        signals: &mut SignalSink<'_>,
    ) -> Result<()> {
        (**self).on_market(event, bars, signals)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
