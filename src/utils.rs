//! Tick quantisation, monotonic identifiers, and high-resolution timestamps.
//!
//! These are the leaf utilities every other module in the crate depends on:
//! order and trade identity, and the price grid every quoted price is
//! snapped to before it ever reaches the book.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// The minimum price increment. All resting prices are integer multiples of this.
pub const TICK_SIZE: f64 = 0.05;

static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

/// Returns the next globally unique, monotonically increasing order id.
///
/// Ids are never reused, even across cancelled or fully filled orders.
pub fn next_order_id() -> u64 {
    NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Returns the current wall-clock time in nanoseconds since the Unix epoch.
///
/// Used for order timestamps (creation and edit) and feed record headers.
/// Never used as an input to matching decisions at a given price level —
/// FIFO there is purely insertion order.
pub fn current_time_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_nanos() as u64
}

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as u64
}

/// Snaps `price` to the nearest multiple of [`TICK_SIZE`], rounded to two
/// decimal places.
///
/// Mirrors the reference implementation's `enforce_tick`: divide by the
/// tick, round to the nearest integer, multiply back, then round again to
/// kill floating-point noise from the division.
#[inline]
pub fn quantise(price: f64) -> f64 {
    round2((price / TICK_SIZE).round() * TICK_SIZE)
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a quantised decimal price into an integer number of ticks.
///
/// Ticks are the internal representation used by the order book (see
/// `orderbook::book`); this is the only place prices cross from decimal
/// into fixed point.
#[inline]
pub fn price_to_ticks(price: f64) -> i64 {
    (quantise(price) / TICK_SIZE).round() as i64
}

/// Converts an integer number of ticks back into a quantised decimal price.
#[inline]
pub fn ticks_to_price(ticks: i64) -> f64 {
    round2(ticks as f64 * TICK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantise_snaps_to_grid() {
        assert_eq!(quantise(100.03), 100.05);
        assert_eq!(quantise(100.0), 100.0);
        assert_eq!(quantise(99.976), 100.0);
    }

    #[test]
    fn ticks_round_trip() {
        let price = 123.45;
        let ticks = price_to_ticks(price);
        assert_eq!(ticks_to_price(ticks), quantise(price));
    }

    #[test]
    fn order_ids_are_monotonic_and_unique() {
        let a = next_order_id();
        let b = next_order_id();
        assert!(b > a);
    }
}
