//! Order sizing policies: signal + current position -> at most one order.

use replay_core::{Direction, OrderEvent, Quantity, Result, Side, SignalEvent};

/// Translates a signal into at most one order.
pub trait OrderSizer {
    fn size(&self, signal: &SignalEvent, current: Quantity) -> Result<Option<OrderEvent>>;
}

impl<F> OrderSizer for F
where
    F: Fn(&SignalEvent, Quantity) -> Result<Option<OrderEvent>>,
{
    fn size(&self, signal: &SignalEvent, current: Quantity) -> Result<Option<OrderEvent>> {
        self(signal, current)
    }
}

/// Fixed-lot market orders. Ignores signal strength.
///
/// | direction | current | order |
/// |---|---|---|
/// | LONG | 0 | BUY lot |
/// | SHORT | 0 | SELL lot |
/// | EXIT | > 0 | SELL current |
/// | EXIT | < 0 | BUY -current |
///
/// Anything else produces no order.
#[derive(Debug, Clone, Copy)]
pub struct NaiveSizer {
    lot_size: Quantity,
}

impl NaiveSizer {
    pub fn new(lot_size: Quantity) -> Self {
        Self { lot_size }
    }
}

impl Default for NaiveSizer {
    fn default() -> Self {
        Self::new(100)
    }
}

impl OrderSizer for NaiveSizer {
    fn size(&self, signal: &SignalEvent, current: Quantity) -> Result<Option<OrderEvent>> {
        let symbol = signal.symbol();
        let order = match (signal.direction(), current) {
            (Direction::Long, 0) => Some(OrderEvent::market(symbol, self.lot_size, Side::Buy)?),
            (Direction::Short, 0) => Some(OrderEvent::market(symbol, self.lot_size, Side::Sell)?),
            (Direction::Exit, q) if q != 0 => match Side::closing(q) {
                Some(side) => Some(OrderEvent::market(symbol, q.abs(), side)?),
                None => None,
            },
            _ => None,
        };
        Ok(order)
    }
}
