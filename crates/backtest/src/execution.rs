//! Execution venue and commission model.
//!
//! The simulated venue fills every order immediately and in full at the
//! latest bar price. No slippage is modeled; the only cost is commission.

use replay_core::config::{CommissionConfig, ExecutionConfig};
use replay_core::{BarSource, FillEvent, OrderEvent, PriceField, Result, Timestamp};
use tracing::debug;

/// Per-fill commission as a function of quantity and fill price.
pub trait CommissionModel {
    fn commission(&self, quantity: u64, price: f64) -> f64;
}

impl<F> CommissionModel for F
where
    F: Fn(u64, f64) -> f64,
{
    fn commission(&self, quantity: u64, price: f64) -> f64 {
        self(quantity, price)
    }
}

/// Tiered per-share schedule: `max(minimum, rate * quantity)`.
#[derive(Debug, Clone)]
pub struct TieredCommission {
    config: CommissionConfig,
}

impl TieredCommission {
    pub fn new(config: CommissionConfig) -> Self {
        Self { config }
    }
}

impl Default for TieredCommission {
    fn default() -> Self {
        Self::new(CommissionConfig::default())
    }
}

impl CommissionModel for TieredCommission {
    fn commission(&self, quantity: u64, _price: f64) -> f64 {
        let rate = if quantity <= self.config.tier_threshold {
            self.config.small_rate
        } else {
            self.config.large_rate
        };
        self.config.minimum.max(rate * quantity as f64)
    }
}

/// Turns orders into fills.
///
/// Venues return their fill instead of enqueueing it; only the engine
/// writes to the event queue. A live broker connector implements the same
/// trait.
pub trait ExecutionVenue {
    /// Execute `order` against the current bar. Must yield exactly one fill.
    fn execute(&mut self, order: &OrderEvent, bars: &dyn BarSource, now: Timestamp) -> Result<FillEvent>;
}

impl<T: ExecutionVenue + ?Sized> ExecutionVenue for Box<T> {
    fn execute(&mut self, order: &OrderEvent, bars: &dyn BarSource, now: Timestamp) -> Result<FillEvent> {
        (**self).execute(order, bars, now)
    }
}

/// Immediate, full fills at the latest bar price.
pub struct SimulatedVenue {
    name: String,
    fill_field: PriceField,
    commission: Box<dyn CommissionModel>,
}

impl SimulatedVenue {
    /// Create a venue with the default tiered commission.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fill_field: PriceField::AdjClose,
            commission: Box::new(TieredCommission::default()),
        }
    }

    /// Create a venue from configuration.
    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self {
            name: config.venue.clone(),
            fill_field: config.fill_field,
            commission: Box::new(TieredCommission::new(config.commission.clone())),
        }
    }

    /// Replace the commission model.
    pub fn with_commission(mut self, model: impl CommissionModel + 'static) -> Self {
        self.commission = Box::new(model);
        self
    }

    /// Fill at a different bar field.
    pub fn with_fill_field(mut self, field: PriceField) -> Self {
        self.fill_field = field;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ExecutionVenue for SimulatedVenue {
    fn execute(&mut self, order: &OrderEvent, bars: &dyn BarSource, now: Timestamp) -> Result<FillEvent> {
        let price = bars.latest_price(order.symbol(), self.fill_field)?;
        let commission = self.commission.commission(order.quantity(), price);

        debug!(
            symbol = order.symbol(),
            side = ?order.side(),
            quantity = order.quantity(),
            price,
            commission,
            "filled"
        );

        FillEvent::new(
            now,
            order.symbol(),
            self.name.as_str(),
            order.quantity(),
            order.side(),
            price,
            commission,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use replay_core::{Bar, Error, Side};
    use replay_ingestion::HistoricBarSource;

    fn make_source() -> HistoricBarSource {
        let bar = Bar {
            ts: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            open: 99.0,
            high: 101.0,
            low: 98.0,
            close: 100.0,
            volume: 1_000.0,
            adj_close: 50.0,
        };
        let mut source = HistoricBarSource::from_series(vec![("AAPL".to_string(), vec![bar])]).unwrap();
        source.advance().unwrap();
        source
    }

    #[test]
    fn test_tiered_commission() {
        let model = TieredCommission::default();
        // Minimum applies to small fills
        assert_relative_eq!(model.commission(1, 100.0), 1.30);
        assert_relative_eq!(model.commission(100, 100.0), 1.30);
        // 0.013 * 200 = 2.6
        assert_relative_eq!(model.commission(200, 100.0), 2.6);
        assert_relative_eq!(model.commission(500, 100.0), 6.5);
        // Large tier: 0.008 * 1000 = 8.0
        assert_relative_eq!(model.commission(501, 100.0), 4.008);
        assert_relative_eq!(model.commission(1_000, 100.0), 8.0);
    }

    #[test]
    fn test_execute_fills_at_latest_price() {
        let source = make_source();
        let mut venue = SimulatedVenue::new("SIM");
        let now = source.latest_timestamp().unwrap();
        let order = OrderEvent::market("AAPL", 100, Side::Buy).unwrap();

        let fill = venue.execute(&order, &source, now).unwrap();

        assert_eq!(fill.symbol(), "AAPL");
        assert_eq!(fill.venue(), "SIM");
        assert_eq!(fill.quantity(), 100);
        assert_eq!(fill.side(), Side::Buy);
        assert_eq!(fill.ts(), now);
        assert_relative_eq!(fill.fill_cost(), 50.0);
        assert_relative_eq!(fill.commission(), 1.30);
    }

    #[test]
    fn test_pluggable_commission_and_field() {
        let source = make_source();
        let mut venue = SimulatedVenue::new("SIM")
            .with_commission(|qty: u64, price: f64| qty as f64 * price * 0.001)
            .with_fill_field(PriceField::Close);
        let order = OrderEvent::market("AAPL", 10, Side::Sell).unwrap();

        let fill = venue.execute(&order, &source, source.latest_timestamp().unwrap()).unwrap();

        assert_relative_eq!(fill.fill_cost(), 100.0);
        assert_relative_eq!(fill.commission(), 1.0);
    }

    #[test]
    fn test_negative_commission_model_rejected() {
        let source = make_source();
        let mut venue = SimulatedVenue::new("SIM").with_commission(|_: u64, _: f64| -1.0);
        let order = OrderEvent::market("AAPL", 10, Side::Buy).unwrap();

        let result = venue.execute(&order, &source, source.latest_timestamp().unwrap());
        assert!(matches!(result, Err(Error::InvalidEvent(_))));
    }

    #[test]
    fn test_unknown_instrument() {
        let source = make_source();
        let mut venue = SimulatedVenue::new("SIM");
        let order = OrderEvent::market("MSFT", 10, Side::Buy).unwrap();

        let result = venue.execute(&order, &source, source.latest_timestamp().unwrap());
        assert!(matches!(result, Err(Error::UnknownInstrument(_))));
    }
}
