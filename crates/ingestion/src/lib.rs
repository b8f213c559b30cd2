//! Historical bar ingestion for the replay-trader system.
//!
//! This crate handles:
//! - CSV parsing of daily OHLCV + adjusted close files
//! - Date-range filtering
//! - Alignment of several instruments to a common, forward-filled calendar
//! - The historic replay [`BarSource`](replay_core::BarSource)

pub mod calendar;
pub mod csv_loader;
pub mod historic;

pub use calendar::align_series;
pub use csv_loader::{load_csv_dir, load_symbol_csv, parse_timestamp, read_bars};
pub use historic::HistoricBarSource;
