//! The composition root: wires the order book, matching engine, and market
//! data feed together behind a single, small public surface.
//!
//! Nothing outside this module needs to know that a submission involves a
//! lock, a skip list walk, and a UDP datagram — callers see `submit`,
//! `cancel`, and `edit`.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::feed::{FeedPublisher, FeedTransport};
use crate::orderbook::{MatchingEngine, OwnerHandle, Side, SubmitOutcome, SubmitRequest, Trend};

/// A single-instrument exchange: order book, matching engine, and feed,
/// bundled behind one API.
pub struct Exchange<T: FeedTransport + 'static> {
    engine: MatchingEngine,
    publisher: Arc<FeedPublisher<T>>,
}

impl<T: FeedTransport + 'static> Exchange<T> {
    /// Builds a new exchange publishing onto `transport`.
    pub fn new(config: EngineConfig, transport: T) -> Self {
        let engine = MatchingEngine::new(config.clone());
        let publisher = Arc::new(FeedPublisher::new(transport, &config));
        let sink_publisher = publisher.clone();
        engine.set_event_sink(Arc::new(move |event| sink_publisher.publish(&event)));
        Exchange { engine, publisher }
    }

    /// Submits a new limit order.
    pub fn submit(&self, side: Side, price: f64, quantity: u32, owner: Option<OwnerHandle>) -> SubmitOutcome {
        self.engine.submit(SubmitRequest { side, price, quantity, owner })
    }

    /// Cancels a resting order. Returns `false` if it was not found.
    pub fn cancel(&self, order_id: u64) -> bool {
        self.engine.cancel(order_id)
    }

    /// Edits a resting order's price and/or quantity in place. Returns
    /// `false` if it was not found. See [`crate::orderbook::OrderBook::edit`]
    /// for the known gap around re-running the band/TER gates.
    pub fn edit(&self, order_id: u64, new_price: f64, new_quantity: u32) -> bool {
        self.engine.edit(order_id, new_price, new_quantity)
    }

    /// Cancels every resting order on both sides of the book.
    pub fn cancel_all(&self) {
        self.engine.cancel_all()
    }

    /// Starts a new trading session at `new_open`. Resting orders are left
    /// exactly as they were; this is a deliberate difference from
    /// [`Self::cancel_all`].
    pub fn reset_for_new_day(&self, new_open: f64) {
        self.engine.reset_for_new_day(new_open)
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.engine.book().best_bid()
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.engine.book().best_ask()
    }

    pub fn market_price(&self) -> f64 {
        self.engine.book().market_price()
    }

    pub fn last_traded_price(&self) -> f64 {
        self.engine.last_traded_price()
    }

    pub fn market_trend(&self) -> Trend {
        self.engine.market_trend()
    }

    pub fn session_trend(&self) -> Trend {
        self.engine.session_trend()
    }

    pub fn is_halted(&self) -> bool {
        self.engine.is_halted()
    }

    /// Direct access to the underlying matching engine, for callers that
    /// need more than this facade exposes (benchmarks, integration tests).
    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Direct access to the feed publisher, mainly for tests that want to
    /// inspect what has been published.
    pub fn publisher(&self) -> &FeedPublisher<T> {
        &self.publisher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::RecordingTransport;
    use std::sync::Arc as StdArc;

    fn exchange() -> Exchange<RecordingTransport> {
        let mut config = EngineConfig::default();
        config.client_slippage_percent = 0.0;
        config.bot_slippage_percent = 0.0;
        Exchange::new(config, RecordingTransport::new())
    }

    #[test]
    fn submit_rests_and_publishes_a_new_record() {
        let exchange = exchange();
        let outcome = exchange.submit(Side::Buy, 699.0, 5, None);
        assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
        assert_eq!(exchange.best_bid(), Some(699.0));
    }

    #[test]
    fn crossing_orders_trade_and_publish_a_trade_record() {
        let exchange = exchange();
        exchange.submit(Side::Sell, 701.0, 5, None);
        let outcome = exchange.submit(Side::Buy, 702.0, 5, None);
        let SubmitOutcome::Accepted { trades, .. } = outcome else { panic!() };
        assert_eq!(trades.len(), 1);
        assert_eq!(exchange.last_traded_price(), 701.0);
    }

    #[test]
    fn owner_callback_receives_trade_confirmation() {
        use std::sync::atomic::{AtomicU32, Ordering};
        let exchange = exchange();
        exchange.submit(Side::Sell, 700.0, 5, None);
        let filled = StdArc::new(AtomicU32::new(0));
        let filled_clone = filled.clone();
        let owner: OwnerHandle = StdArc::new(move |confirmation| {
            if let crate::orderbook::Confirmation::Trade { quantity, .. } = confirmation {
                filled_clone.fetch_add(quantity, Ordering::SeqCst);
            }
        });
        exchange.submit(Side::Buy, 700.0, 5, Some(owner));
        assert_eq!(filled.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn cancel_and_edit_round_trip() {
        let exchange = exchange();
        let outcome = exchange.submit(Side::Buy, 699.0, 5, None);
        let SubmitOutcome::Accepted { order_id, .. } = outcome else { panic!() };
        assert!(exchange.edit(order_id, 698.0, 3));
        assert_eq!(exchange.best_bid(), Some(698.0));
        assert!(exchange.cancel(order_id));
        assert_eq!(exchange.best_bid(), None);
    }
}
