//! The matching engine: the single point through which every order
//! submission, cancel, and edit passes.
//!
//! All mutating operations serialise through one internal lock (§5 of the
//! system design) — there is no per-level or per-book fine-grained locking
//! here, by design. A submission blocks synchronously until matching is
//! complete and returns the full result, including every trade it caused.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;

use super::book::OrderBook;
use super::circuit::CircuitBreaker;
use super::order::{Confirmation, Order, OwnerHandle, Side};
use super::trade::Trade;
use super::trend::{Trend, TrendIndicator};
use crate::config::EngineConfig;
use crate::utils;

/// A caller-visible event raised by the engine, in strict emission order.
///
/// This is deliberately transport-agnostic: the feed module subscribes to
/// these and turns them into wire records, but the matching engine itself
/// knows nothing about sequence numbers or UDP.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A new order was accepted and rested (or began matching).
    New { order_id: u64, side: Side, price: f64, quantity: u32 },
    /// A match occurred.
    Trade { trade: Trade },
    /// An order was cancelled.
    CancelAck { order_id: u64, side: Side },
    /// An order was edited in place.
    Edited { order_id: u64, side: Side, price: f64, quantity: u32 },
    /// A submission was rejected at ingress.
    Rejected { reason: String },
}

/// Callback invoked with every [`EngineEvent`] the engine raises.
pub type EventSink = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// A new order submission.
pub struct SubmitRequest {
    pub side: Side,
    pub price: f64,
    pub quantity: u32,
    pub owner: Option<OwnerHandle>,
}

/// The result of a submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Rejected outright; nothing was rested or matched.
    Rejected { reason: String },
    /// Accepted. `resting_quantity` is zero if the order filled completely.
    Accepted {
        order_id: u64,
        trades: Vec<Trade>,
        resting_quantity: u32,
    },
}

/// The matching engine for a single instrument.
pub struct MatchingEngine {
    book: OrderBook,
    config: EngineConfig,
    circuit_breaker: Arc<CircuitBreaker>,
    trend: TrendIndicator,
    session_open: Mutex<f64>,
    band_percent: Mutex<f64>,
    last_traded_price: Mutex<f64>,
    event_sink: Mutex<Option<EventSink>>,
    /// The single lock every mutating operation serialises through.
    lock: Mutex<()>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let open = config.initial_price;
        let band_percent = config.max_daily_move_percent;
        MatchingEngine {
            book: OrderBook::new(open),
            circuit_breaker: Arc::new(CircuitBreaker::new()),
            trend: TrendIndicator::new(open),
            session_open: Mutex::new(open),
            band_percent: Mutex::new(band_percent),
            last_traded_price: Mutex::new(open),
            event_sink: Mutex::new(None),
            lock: Mutex::new(()),
            config,
        }
    }

    /// Installs the callback used to publish [`EngineEvent`]s. Typically
    /// wired to the feed sequencer by [`crate::Exchange`].
    pub fn set_event_sink(&self, sink: EventSink) {
        *self.event_sink.lock().expect("event sink mutex poisoned") = Some(sink);
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = self.event_sink.lock().expect("event sink mutex poisoned").as_ref() {
            sink(event);
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn market_trend(&self) -> Trend {
        self.trend.market_trend()
    }

    pub fn session_trend(&self) -> Trend {
        self.trend.session_trend()
    }

    pub fn last_traded_price(&self) -> f64 {
        *self.last_traded_price.lock().expect("last traded price mutex poisoned")
    }

    pub fn session_open(&self) -> f64 {
        *self.session_open.lock().expect("session open mutex poisoned")
    }

    pub fn is_halted(&self) -> bool {
        self.circuit_breaker.is_tripped()
    }

    /// Submits a new order. Blocks until every possible match against the
    /// resting book has been made and any remainder has been rested.
    pub fn submit(&self, req: SubmitRequest) -> SubmitOutcome {
        let _guard = self.lock.lock().expect("engine mutex poisoned");

        if self.circuit_breaker.check_and_clear() {
            return self.reject(req.owner, "circuit breaker is active".to_string());
        }

        let gated_price = match self.clamp_and_gate(req.price) {
            Ok(price) => price,
            Err(reason) => return self.reject(req.owner, reason),
        };

        let order = Order::new(req.side, gated_price, req.quantity, req.owner);
        let order_id = order.id;
        self.emit(EngineEvent::New {
            order_id,
            side: order.side,
            price: order.price,
            quantity: order.quantity,
        });

        let (trades, remainder) = self.match_order(order);
        let resting_quantity = match remainder {
            Some(leftover) => {
                let quantity = leftover.quantity;
                // Insertion cannot fail here: `match_order` only returns a
                // remainder with quantity > 0, and price was quantised by
                // `Order::new`.
                self.book.insert(leftover).expect("validated order rejected by book");
                quantity
            }
            None => 0,
        };

        SubmitOutcome::Accepted {
            order_id,
            trades,
            resting_quantity,
        }
    }

    fn reject(&self, owner: Option<OwnerHandle>, reason: String) -> SubmitOutcome {
        self.emit(EngineEvent::Rejected { reason: reason.clone() });
        if let Some(owner) = owner {
            owner(Confirmation::Rejected { reason: reason.clone() });
        }
        SubmitOutcome::Rejected { reason }
    }

    /// Clamps `price` into the current daily band, then rejects it if the
    /// clamped price still falls outside the (tighter, fixed) trading
    /// execution range. Clamping happens first: the band only ever narrows
    /// what reaches the TER check, it never widens it.
    fn clamp_and_gate(&self, price: f64) -> Result<f64, String> {
        let open = self.session_open();
        let band_percent = *self.band_percent.lock().expect("band percent mutex poisoned");
        let band_low = open * (1.0 - band_percent / 100.0);
        let band_high = open * (1.0 + band_percent / 100.0);
        let clamped = price.clamp(band_low, band_high);

        let ter_low = open * (1.0 - self.config.ter_percent / 100.0);
        let ter_high = open * (1.0 + self.config.ter_percent / 100.0);
        if clamped < ter_low || clamped > ter_high {
            return Err(format!(
                "price {:.2} is outside the trading execution range [{:.2}, {:.2}]",
                clamped, ter_low, ter_high
            ));
        }
        Ok(utils::quantise(clamped))
    }

    /// Walks the opposite side of the book, matching `incoming` against it
    /// at price/time priority until either `incoming` is fully filled or the
    /// book no longer crosses. Returns every trade produced plus, if
    /// anything remains, the (still-unrested) leftover order.
    fn match_order(&self, mut incoming: Order) -> (Vec<Trade>, Option<Order>) {
        let mut trades = Vec::new();
        let opposite = incoming.side.opposite();

        while incoming.quantity > 0 {
            let entry = match opposite {
                Side::Buy => self.book.best_bid_entry(),
                Side::Sell => self.book.best_ask_entry(),
            };
            let Some((ticks, level)) = entry else { break };
            let level_price = utils::ticks_to_price(ticks);
            let crosses = match incoming.side {
                Side::Buy => incoming.price >= level_price,
                Side::Sell => incoming.price <= level_price,
            };
            if !crosses {
                break;
            }

            let remaining = incoming.quantity;
            let head_result = level.with_head_mut(|head| {
                let trade_qty = remaining.min(head.quantity);
                head.quantity -= trade_qty;
                let removed = head.quantity == 0;
                ((head.id, head.owner.clone(), trade_qty, removed), removed)
            });

            let Some((resting_id, resting_owner, trade_qty, removed)) = head_result else {
                // Level is empty but still present in the skip map; drop it
                // and keep walking rather than spin.
                self.book.drop_level_if_empty(opposite, ticks);
                continue;
            };

            if removed {
                self.book.untrack(resting_id);
                self.book.drop_level_if_empty(opposite, ticks);
            }

            incoming.quantity -= trade_qty;

            let is_client_aggressor = incoming.owner.is_some();
            let trade_price = self.apply_slippage(level_price, incoming.side, is_client_aggressor);
            self.check_band_breach(trade_price);

            *self.last_traded_price.lock().expect("last traded price mutex poisoned") = trade_price;
            self.trend.record_trade(trade_price);

            let trade = Trade::new(resting_id, incoming.id, incoming.side, trade_qty, trade_price);

            if let Some(owner) = &resting_owner {
                owner(Confirmation::Trade { quantity: trade_qty, price: trade_price });
            }
            if let Some(owner) = &incoming.owner {
                owner(Confirmation::Trade { quantity: trade_qty, price: trade_price });
            }
            self.emit(EngineEvent::Trade { trade: trade.clone() });
            trades.push(trade);
        }

        if incoming.quantity > 0 {
            (trades, Some(incoming))
        } else {
            (trades, None)
        }
    }

    /// Perturbs `base_price` with symmetric, zero-mean noise drawn uniformly
    /// from `[-delta/2, delta/2]`, where `delta = percent/100 * base_price` —
    /// the noise can move the price either direction for either side, it is
    /// not a one-sided worsening of the aggressor's fill. Client flow
    /// (orders with an owner) and bot flow (orders without one) use
    /// different envelopes.
    fn apply_slippage(&self, base_price: f64, aggressor_side: Side, is_client: bool) -> f64 {
        let percent = if is_client {
            self.config.client_slippage_percent
        } else {
            self.config.bot_slippage_percent
        };
        if percent <= 0.0 {
            return utils::quantise(base_price);
        }
        let delta = percent / 100.0 * base_price;
        let noise = rand::rng().random_range(-delta / 2.0..=delta / 2.0);
        let adjusted = match aggressor_side {
            Side::Buy => base_price + noise,
            Side::Sell => base_price - noise,
        };
        utils::quantise(adjusted)
    }

    /// Trips the circuit breaker and expands the daily band when a trade
    /// prints at or beyond the current band edge. Uses the post-slippage
    /// trade price, matching the reference implementation, which compares
    /// the already-adjusted execution price against the band.
    fn check_band_breach(&self, trade_price: f64) {
        let open = self.session_open();
        let mut band_percent = self.band_percent.lock().expect("band percent mutex poisoned");
        let band_low = open * (1.0 - *band_percent / 100.0);
        let band_high = open * (1.0 + *band_percent / 100.0);
        if trade_price <= band_low || trade_price >= band_high {
            *band_percent += self.config.band_expansion_increment;
            drop(band_percent);
            tracing::warn!(trade_price, band_low, band_high, "daily band breached, tripping circuit breaker");
            self.circuit_breaker
                .trip(Duration::from_secs_f64(self.config.circuit_breaker_duration_secs));
        }
    }

    /// Cancels the order with `id`. Returns `true` if it was resting and was
    /// removed. Unknown or already-gone orders are a normal `false`, not an
    /// error or feed event.
    pub fn cancel(&self, id: u64) -> bool {
        let _guard = self.lock.lock().expect("engine mutex poisoned");
        match self.book.remove(id) {
            Some(order) => {
                order.notify(Confirmation::Cancelled { order_id: id });
                self.emit(EngineEvent::CancelAck { order_id: id, side: order.side });
                true
            }
            None => false,
        }
    }

    /// Edits the order with `id` in place: new price and quantity, loses
    /// queue priority. Does **not** re-run the daily band or TER gates —
    /// see [`super::book::OrderBook::edit`].
    pub fn edit(&self, id: u64, new_price: f64, new_quantity: u32) -> bool {
        let _guard = self.lock.lock().expect("engine mutex poisoned");
        match self.book.edit(id, new_price, new_quantity) {
            Ok(Some(order)) => {
                order.notify(Confirmation::Edited { order_id: id });
                self.emit(EngineEvent::Edited {
                    order_id: id,
                    side: order.side,
                    price: order.price,
                    quantity: order.quantity,
                });
                true
            }
            Ok(None) | Err(_) => false,
        }
    }

    /// Removes every resting order from the book. Distinct from
    /// [`Self::reset_for_new_day`], which does not touch resting orders.
    pub fn cancel_all(&self) {
        let _guard = self.lock.lock().expect("engine mutex poisoned");
        self.book.clear();
    }

    /// Starts a new trading session: rebases the opening price, resets the
    /// daily band to its configured starting width, clears the traded-price
    /// history, and clears any active halt. Resting orders are left alone.
    pub fn reset_for_new_day(&self, new_open: f64) {
        let _guard = self.lock.lock().expect("engine mutex poisoned");
        *self.session_open.lock().expect("session open mutex poisoned") = new_open;
        *self.band_percent.lock().expect("band percent mutex poisoned") = self.config.max_daily_move_percent;
        *self.last_traded_price.lock().expect("last traded price mutex poisoned") = new_open;
        self.trend.reset_for_new_day(new_open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn engine() -> MatchingEngine {
        let mut config = EngineConfig::default();
        config.client_slippage_percent = 0.0;
        config.bot_slippage_percent = 0.0;
        MatchingEngine::new(config)
    }

    fn req(side: Side, price: f64, quantity: u32) -> SubmitRequest {
        SubmitRequest { side, price, quantity, owner: None }
    }

    #[test]
    fn resting_order_with_no_cross_just_rests() {
        let engine = engine();
        let outcome = engine.submit(req(Side::Buy, 699.0, 5));
        match outcome {
            SubmitOutcome::Accepted { trades, resting_quantity, .. } => {
                assert!(trades.is_empty());
                assert_eq!(resting_quantity, 5);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
        assert_eq!(engine.book().best_bid(), Some(699.0));
    }

    #[test]
    fn crossing_order_matches_at_resting_price() {
        let engine = engine();
        engine.submit(req(Side::Sell, 701.0, 5));
        let outcome = engine.submit(req(Side::Buy, 702.0, 5));
        match outcome {
            SubmitOutcome::Accepted { trades, resting_quantity, .. } => {
                assert_eq!(trades.len(), 1);
                assert_eq!(trades[0].price, 701.0);
                assert_eq!(resting_quantity, 0);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
        assert_eq!(engine.book().best_ask(), None);
    }

    #[test]
    fn partial_fill_leaves_remainder_resting() {
        let engine = engine();
        engine.submit(req(Side::Sell, 700.0, 3));
        let outcome = engine.submit(req(Side::Buy, 700.0, 10));
        match outcome {
            SubmitOutcome::Accepted { trades, resting_quantity, .. } => {
                assert_eq!(trades.len(), 1);
                assert_eq!(trades[0].quantity, 3);
                assert_eq!(resting_quantity, 7);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn price_far_outside_ter_is_rejected() {
        let engine = engine();
        let outcome = engine.submit(req(Side::Buy, 1000.0, 1));
        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
    }

    #[test]
    fn cancel_unknown_order_is_false() {
        let engine = engine();
        assert!(!engine.cancel(12345));
    }

    #[test]
    fn cancel_resting_order_succeeds() {
        let engine = engine();
        let outcome = engine.submit(req(Side::Buy, 699.0, 5));
        let SubmitOutcome::Accepted { order_id, .. } = outcome else { panic!() };
        assert!(engine.cancel(order_id));
        assert_eq!(engine.book().best_bid(), None);
    }

    #[test]
    fn circuit_breaker_rejects_new_submissions_while_tripped() {
        let mut config = EngineConfig::default();
        config.client_slippage_percent = 0.0;
        config.bot_slippage_percent = 0.0;
        config.max_daily_move_percent = 1.0;
        config.ter_percent = 50.0;
        config.circuit_breaker_duration_secs = 60.0;
        let engine = MatchingEngine::new(config);
        // Rest a sell far enough out to breach the (narrow) band once it trades.
        engine.submit(req(Side::Sell, 707.0, 5));
        let outcome = engine.submit(req(Side::Buy, 707.0, 5));
        assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
        assert!(engine.is_halted());
        let rejected = engine.submit(req(Side::Buy, 700.0, 1));
        assert!(matches!(rejected, SubmitOutcome::Rejected { .. }));
    }

    #[test]
    fn reset_for_new_day_leaves_resting_orders_in_place() {
        let engine = engine();
        engine.submit(req(Side::Buy, 699.0, 5));
        engine.reset_for_new_day(720.0);
        assert_eq!(engine.book().best_bid(), Some(699.0));
        assert_eq!(engine.session_open(), 720.0);
    }

    #[test]
    fn cancel_all_clears_resting_orders() {
        let engine = engine();
        engine.submit(req(Side::Buy, 699.0, 5));
        engine.cancel_all();
        assert_eq!(engine.book().best_bid(), None);
    }

    #[test]
    fn event_sink_observes_new_and_trade_events() {
        let engine = engine();
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        engine.set_event_sink(Arc::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        engine.submit(req(Side::Sell, 700.0, 5));
        engine.submit(req(Side::Buy, 700.0, 5));
        assert!(count.load(Ordering::SeqCst) >= 3);
    }
}
