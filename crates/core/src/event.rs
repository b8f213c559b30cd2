//! Event taxonomy flowing through the simulation cascade.
//!
//! Events are immutable once constructed. Constructors check the invariants
//! of each variant and return [`Error::InvalidEvent`] rather than clamping.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Direction, OrderKind, Side, Timestamp};

/// Discriminant of an [`Event`], used for dispatch logs and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

/// A message on the event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Market(MarketEvent),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    /// Get the variant tag.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Market(_) => EventKind::Market,
            Event::Signal(_) => EventKind::Signal,
            Event::Order(_) => EventKind::Order,
            Event::Fill(_) => EventKind::Fill,
        }
    }
}

/// A new bar is available for every tracked instrument.
///
/// Carries the simulation clock: the bar timestamp and its index in the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Timestamp of the bar just advanced to.
    pub ts: Timestamp,
    /// Zero-based bar index within the run.
    pub bar_index: usize,
}

/// Directional intent emitted by a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    strategy_id: u32,
    symbol: String,
    ts: Timestamp,
    direction: Direction,
    strength: f64,
}

impl SignalEvent {
    /// Create a signal. `strength` must be positive and finite.
    pub fn new(
        strategy_id: u32,
        symbol: impl Into<String>,
        ts: Timestamp,
        direction: Direction,
        strength: f64,
    ) -> Result<Self> {
        if !strength.is_finite() || strength <= 0.0 {
            return Err(Error::invalid_event(format!(
                "signal strength must be positive, got {strength}"
            )));
        }
        Ok(Self {
            strategy_id,
            symbol: symbol.into(),
            ts,
            direction,
            strength,
        })
    }

    pub fn strategy_id(&self) -> u32 {
        self.strategy_id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn ts(&self) -> Timestamp {
        self.ts
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Scaling suggestion for sizing policies.
    pub fn strength(&self) -> f64 {
        self.strength
    }
}

/// Instruction sent to an execution venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    symbol: String,
    kind: OrderKind,
    quantity: u64,
    side: Side,
}

impl OrderEvent {
    /// Create an order. Quantities of zero or below are rejected.
    pub fn new(symbol: impl Into<String>, kind: OrderKind, quantity: i64, side: Side) -> Result<Self> {
        let symbol = symbol.into();
        if quantity <= 0 {
            return Err(Error::invalid_event(format!(
                "order quantity must be positive, got {quantity} for {symbol}"
            )));
        }
        Ok(Self {
            symbol,
            kind,
            quantity: quantity as u64,
            side,
        })
    }

    /// Shorthand for a market order.
    pub fn market(symbol: impl Into<String>, quantity: i64, side: Side) -> Result<Self> {
        Self::new(symbol, OrderKind::Market, quantity, side)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

/// An executed order as reported by a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    ts: Timestamp,
    symbol: String,
    venue: String,
    quantity: u64,
    side: Side,
    fill_cost: f64,
    commission: f64,
}

impl FillEvent {
    /// Create a fill. Quantity must be positive, commission non-negative and
    /// the fill price finite.
    pub fn new(
        ts: Timestamp,
        symbol: impl Into<String>,
        venue: impl Into<String>,
        quantity: u64,
        side: Side,
        fill_cost: f64,
        commission: f64,
    ) -> Result<Self> {
        let symbol = symbol.into();
        if quantity == 0 {
            return Err(Error::invalid_event(format!("fill quantity must be positive for {symbol}")));
        }
        if !commission.is_finite() || commission < 0.0 {
            return Err(Error::invalid_event(format!(
                "commission must be non-negative, got {commission} for {symbol}"
            )));
        }
        if !fill_cost.is_finite() {
            return Err(Error::invalid_event(format!("fill price is not finite for {symbol}")));
        }
        Ok(Self {
            ts,
            symbol,
            venue: venue.into(),
            quantity,
            side,
            fill_cost,
            commission,
        })
    }

    pub fn ts(&self) -> Timestamp {
        self.ts
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Per-unit fill price.
    pub fn fill_cost(&self) -> f64 {
        self.fill_cost
    }

    pub fn commission(&self) -> f64 {
        self.commission
    }

    /// Signed quantity: positive for buys, negative for sells.
    pub fn signed_quantity(&self) -> i64 {
        self.side.sign() * self.quantity as i64
    }

    /// Cash consumed by this fill, commission included.
    pub fn cash_outflow(&self) -> f64 {
        self.side.sign_f64() * self.fill_cost * self.quantity as f64 + self.commission
    }
}
