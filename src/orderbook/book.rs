//! The two-sided, price/time-priority order book.
//!
//! Bids and asks are each kept as a [`crossbeam_skiplist::SkipMap`] keyed by
//! integer tick (ascending order, so the best bid is the *back* of the bid
//! map and the best ask is the *front* of the ask map), with each entry an
//! `Arc<PriceLevel>` holding the FIFO of orders resting there. A `DashMap`
//! from order id to `(ticks, Side)` gives O(1) lookup of which level an
//! order lives on for cancel/edit, mirroring the teacher crate's
//! `order_locations` index.

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use std::sync::Arc;

use super::error::OrderBookError;
use super::level::PriceLevel;
use super::order::{Order, Side};
use crate::utils;

/// Where a resting order sits: which tick and which side.
type Location = (i64, Side);

/// The order book for a single instrument.
pub struct OrderBook {
    bids: SkipMap<i64, Arc<PriceLevel>>,
    asks: SkipMap<i64, Arc<PriceLevel>>,
    order_locations: DashMap<u64, Location>,
    initial_price: f64,
}

impl OrderBook {
    /// Builds an empty book. `initial_price` is returned by [`Self::market_price`]
    /// when neither side has a resting order.
    pub fn new(initial_price: f64) -> Self {
        OrderBook {
            bids: SkipMap::new(),
            asks: SkipMap::new(),
            order_locations: DashMap::new(),
            initial_price,
        }
    }

    fn side_map(&self, side: Side) -> &SkipMap<i64, Arc<PriceLevel>> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn level_for(&self, side: Side, ticks: i64) -> Arc<PriceLevel> {
        self.side_map(side)
            .get_or_insert_with(ticks, || Arc::new(PriceLevel::new()))
            .value()
            .clone()
    }

    /// Rests `order` on the book. The order must already be quantised and
    /// carry a valid quantity; callers (the matching engine) are responsible
    /// for gating those before insertion.
    pub fn insert(&self, order: Order) -> Result<(), OrderBookError> {
        if order.quantity == 0 {
            return Err(OrderBookError::InvalidQuantity {
                quantity: order.quantity as i64,
            });
        }
        let ticks = utils::price_to_ticks(order.price);
        let id = order.id;
        let side = order.side;
        self.level_for(side, ticks).push_back(order);
        self.order_locations.insert(id, (ticks, side));
        Ok(())
    }

    /// Removes and returns the order with `id`, wherever it rests. Drops the
    /// price level entirely once it becomes empty. Returns `None` if the
    /// order is not currently resting (already filled, cancelled, or unknown).
    pub fn remove(&self, id: u64) -> Option<Order> {
        let (_, (ticks, side)) = self.order_locations.remove(&id)?;
        let map = self.side_map(side);
        let level = map.get(&ticks)?.value().clone();
        let order = level.remove(id);
        if level.is_empty() {
            map.remove(&ticks);
        }
        order
    }

    /// Cancels the order with `id`. Returns `true` if an order was actually
    /// resting and removed; `false` if it was unknown or already gone — this
    /// is an expected outcome, not an error.
    pub fn cancel(&self, id: u64) -> bool {
        self.remove(id).is_some()
    }

    /// Replaces the order with `id` in place: cancels the old resting order
    /// and re-inserts a fresh one with the same id, new price and quantity,
    /// and a new timestamp — so an edit loses queue priority, exactly like a
    /// cancel-then-resubmit would. Returns `false` if the order was not
    /// resting.
    ///
    /// Per the reference implementation, an edit does **not** re-run the
    /// daily band or TER gates; those are ingress-only checks applied by the
    /// matching engine on first submission. An edit that moves a price
    /// outside the current band can rest there. This is a known, deliberate
    /// gap inherited from the system being modeled, not an oversight.
    pub fn edit(&self, id: u64, new_price: f64, new_quantity: u32) -> Result<Option<Order>, OrderBookError> {
        if new_quantity == 0 {
            return Err(OrderBookError::InvalidQuantity {
                quantity: new_quantity as i64,
            });
        }
        let Some(mut order) = self.remove(id) else {
            return Ok(None);
        };
        order.price = utils::quantise(new_price);
        order.quantity = new_quantity;
        order.timestamp_ns = utils::current_time_ns();
        self.insert(order.clone())?;
        Ok(Some(order))
    }

    /// The best (highest) resting bid price, if any.
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.back().map(|e| utils::ticks_to_price(*e.key()))
    }

    /// The best (lowest) resting ask price, if any.
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.front().map(|e| utils::ticks_to_price(*e.key()))
    }

    /// A blended view of "the" current price: when both sides are present,
    /// the average of the simple mid and the volume-weighted price of the
    /// two best levels; whichever single side is present when only one is;
    /// the book's configured initial price when the book is empty.
    pub fn market_price(&self) -> f64 {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => {
                let bid_qty = self.best_bid_level().map(|l| l.total_quantity()).unwrap_or(0) as f64;
                let ask_qty = self.best_ask_level().map(|l| l.total_quantity()).unwrap_or(0) as f64;
                let mid = (bid + ask) / 2.0;
                let vwap = (bid_qty * bid + ask_qty * ask) / (bid_qty + ask_qty);
                utils::quantise((mid + vwap) / 2.0)
            }
            (Some(bid), None) => bid,
            (None, Some(ask)) => ask,
            (None, None) => self.initial_price,
        }
    }

    /// The highest-priority (head) resting bid, by reference to its price
    /// level, without removing it.
    pub(crate) fn best_bid_level(&self) -> Option<Arc<PriceLevel>> {
        self.bids.back().map(|e| e.value().clone())
    }

    /// The highest-priority (head) resting ask level, without removing it.
    pub(crate) fn best_ask_level(&self) -> Option<Arc<PriceLevel>> {
        self.asks.front().map(|e| e.value().clone())
    }

    /// The best bid's tick and level together, for callers (the matching
    /// engine) that need both the crossing price and the FIFO in one lookup.
    pub(crate) fn best_bid_entry(&self) -> Option<(i64, Arc<PriceLevel>)> {
        self.bids.back().map(|e| (*e.key(), e.value().clone()))
    }

    /// The best ask's tick and level together.
    pub(crate) fn best_ask_entry(&self) -> Option<(i64, Arc<PriceLevel>)> {
        self.asks.front().map(|e| (*e.key(), e.value().clone()))
    }

    pub(crate) fn drop_level_if_empty(&self, side: Side, ticks: i64) {
        let map = self.side_map(side);
        if let Some(entry) = map.get(&ticks) {
            if entry.value().is_empty() {
                entry.remove();
            }
        }
    }

    pub(crate) fn untrack(&self, id: u64) {
        self.order_locations.remove(&id);
    }

    pub(crate) fn location_of(&self, id: u64) -> Option<Location> {
        self.order_locations.get(&id).map(|e| *e.value())
    }

    /// Number of distinct orders resting anywhere in the book.
    pub fn order_count(&self) -> usize {
        self.order_locations.len()
    }

    /// Removes every resting order from both sides. Used by
    /// [`crate::Exchange::cancel_all`]; the daily reset (§4.3.3) deliberately
    /// does *not* call this.
    pub fn clear(&self) {
        self.bids.clear();
        self.asks.clear();
        self.order_locations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned_order(side: Side, price: f64, qty: u32) -> Order {
        Order::new(side, price, qty, None)
    }

    #[test]
    fn empty_book_reports_initial_price() {
        let book = OrderBook::new(700.0);
        assert_eq!(book.market_price(), 700.0);
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn best_bid_is_highest_and_best_ask_is_lowest() {
        let book = OrderBook::new(700.0);
        book.insert(owned_order(Side::Buy, 699.0, 5)).unwrap();
        book.insert(owned_order(Side::Buy, 701.0, 5)).unwrap();
        book.insert(owned_order(Side::Sell, 705.0, 5)).unwrap();
        book.insert(owned_order(Side::Sell, 703.0, 5)).unwrap();
        assert_eq!(book.best_bid(), Some(701.0));
        assert_eq!(book.best_ask(), Some(703.0));
        assert_eq!(book.market_price(), 702.0);
    }

    #[test]
    fn cancel_unknown_order_returns_false() {
        let book = OrderBook::new(700.0);
        assert!(!book.cancel(999));
    }

    #[test]
    fn cancel_removes_order_and_drops_empty_level() {
        let book = OrderBook::new(700.0);
        let order = owned_order(Side::Buy, 700.0, 3);
        let id = order.id;
        book.insert(order).unwrap();
        assert!(book.cancel(id));
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.order_count(), 0);
    }

    #[test]
    fn edit_preserves_id_but_moves_price_and_resets_priority() {
        let book = OrderBook::new(700.0);
        let order = owned_order(Side::Buy, 700.0, 3);
        let id = order.id;
        book.insert(order).unwrap();
        assert!(book.edit(id, 701.0, 4).unwrap().is_some());
        assert_eq!(book.best_bid(), Some(701.0));
        assert_eq!(book.order_count(), 1);
    }

    #[test]
    fn edit_unknown_order_returns_false() {
        let book = OrderBook::new(700.0);
        assert!(book.edit(42, 1.0, 1).unwrap().is_none());
    }

    #[test]
    fn fifo_priority_within_a_level() {
        let book = OrderBook::new(700.0);
        let first = owned_order(Side::Sell, 700.0, 5);
        let second = owned_order(Side::Sell, 700.0, 5);
        let first_id = first.id;
        book.insert(first).unwrap();
        book.insert(second).unwrap();
        let level = book.best_ask_level().unwrap();
        let snap = level.snapshot();
        assert_eq!(snap[0].id, first_id);
    }
}
