//! Core data types for the replay-trader system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bar timestamp (UTC).
pub type Timestamp = DateTime<Utc>;

/// Instrument identifier (ticker symbol).
pub type Symbol = String;

/// Position quantity: positive = long, negative = short.
pub type Quantity = i64;

/// One OHLCV observation plus adjusted close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp.
    pub ts: Timestamp,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
    /// Split/dividend adjusted close.
    pub adj_close: f64,
}

impl Bar {
    /// Read a single field of the bar.
    #[inline]
    pub fn value(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Volume => self.volume,
            PriceField::AdjClose => self.adj_close,
        }
    }
}

/// Selects one field of a [`Bar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    AdjClose,
}

impl Default for PriceField {
    fn default() -> Self {
        PriceField::AdjClose
    }
}

/// Directional intent carried by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Open a long position.
    Long,
    /// Open a short position.
    Short,
    /// Flatten the current position.
    Exit,
}

/// Order / fill side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i8)]
pub enum Side {
    Buy = 1,
    Sell = -1,
}

impl Side {
    /// Get the sign: +1 for buy, -1 for sell.
    #[inline]
    pub fn sign(self) -> i64 {
        self as i8 as i64
    }

    /// Get the sign as f64.
    #[inline]
    pub fn sign_f64(self) -> f64 {
        self.sign() as f64
    }

    /// The side that flattens a position of the given sign.
    pub fn closing(position: Quantity) -> Option<Side> {
        match position.signum() {
            1 => Some(Side::Sell),
            -1 => Some(Side::Buy),
            _ => None,
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Market,
    Limit,
}
