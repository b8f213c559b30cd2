//! Core types and contracts for the replay-trader system.
//!
//! This crate provides shared types used across all other crates:
//! - Bar and event types (market, signal, order, fill)
//! - The event queue and signal sink
//! - Bar source and strategy contracts
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod event;
pub mod queue;
pub mod source;
pub mod strategy;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, EventKind, FillEvent, MarketEvent, OrderEvent, SignalEvent};
pub use queue::{EventQueue, SignalSink};
pub use source::BarSource;
pub use strategy::Strategy;
pub use types::*;
