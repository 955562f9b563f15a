//! The core order entity and the capability used to route confirmations
//! back to whoever submitted it.

use std::fmt;
use std::sync::Arc;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// A buy (bid) order.
    Buy,
    /// A sell (ask) order.
    Sell,
}

impl Side {
    /// The opposite side — the side a resting order of this side is matched against.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// The single-character wire encoding used by the feed codec (`B`/`S`).
    #[inline]
    pub fn as_byte(self) -> u8 {
        match self {
            Side::Buy => b'B',
            Side::Sell => b'S',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "B"),
            Side::Sell => write!(f, "S"),
        }
    }
}

/// A confirmation delivered to an order's owner.
///
/// Owners are opaque capabilities (see [`OwnerHandle`]); the engine knows
/// nothing about them beyond "call this with a `Confirmation`".
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// This order, or part of it, traded.
    Trade {
        /// Quantity filled in this particular trade.
        quantity: u32,
        /// Price at which it filled (post-slippage).
        price: f64,
    },
    /// The order was cancelled.
    Cancelled {
        /// The order's id.
        order_id: u64,
    },
    /// An edit to the order was applied.
    Edited {
        /// The order's id.
        order_id: u64,
    },
    /// The order was rejected at ingress and never rested.
    Rejected {
        /// Human-readable reason.
        reason: String,
    },
}

/// An opaque capability used to deliver [`Confirmation`]s to an order's
/// submitter.
///
/// Modeled as a callback rather than a connection or session object, so the
/// engine never depends on *how* a confirmation reaches its destination —
/// only that calling the handle is how delivery happens. Delivery failures
/// are the owner's problem; see [`crate::orderbook::error::OrderBookError`].
pub type OwnerHandle = Arc<dyn Fn(Confirmation) + Send + Sync>;

/// An order resting in, or about to enter, the book.
#[derive(Clone)]
pub struct Order {
    /// Monotonically assigned unique identifier. Stable across partial fills and edits.
    pub id: u64,
    /// Buy or sell.
    pub side: Side,
    /// Quantised limit price, in decimal units (see [`crate::utils::quantise`]).
    pub price: f64,
    /// Remaining quantity. Decreases as fills occur; never negative.
    pub quantity: u32,
    /// Nanosecond timestamp of creation, or of the most recent edit.
    pub timestamp_ns: u64,
    /// Capability used to deliver confirmations to the submitter, if any.
    pub owner: Option<OwnerHandle>,
    /// Whether this order is still live. An inactive order is never resting
    /// and never matched again.
    pub active: bool,
}

impl Order {
    /// Builds a new, active order with a freshly assigned id and timestamp.
    pub fn new(side: Side, price: f64, quantity: u32, owner: Option<OwnerHandle>) -> Self {
        Order {
            id: crate::utils::next_order_id(),
            side,
            price: crate::utils::quantise(price),
            quantity,
            timestamp_ns: crate::utils::current_time_ns(),
            owner,
            active: true,
        }
    }

    /// Delivers `confirmation` to this order's owner, if any. Swallows and
    /// logs delivery failures (a panic inside the callback is not caught —
    /// callers are expected to supply a handle that cannot panic — but the
    /// engine itself never treats "no owner" as an error).
    pub fn notify(&self, confirmation: Confirmation) {
        if let Some(owner) = &self.owner {
            owner(confirmation);
        }
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("side", &self.side)
            .field("price", &self.price)
            .field("quantity", &self.quantity)
            .field("timestamp_ns", &self.timestamp_ns)
            .field("active", &self.active)
            .field("has_owner", &self.owner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_is_active_and_quantised() {
        let order = Order::new(Side::Buy, 100.03, 10, None);
        assert!(order.active);
        assert_eq!(order.price, 100.05);
        assert_eq!(order.quantity, 10);
    }

    #[test]
    fn notify_without_owner_is_a_no_op() {
        let order = Order::new(Side::Sell, 50.0, 5, None);
        order.notify(Confirmation::Cancelled { order_id: order.id });
    }

    #[test]
    fn notify_invokes_owner_handle() {
        use std::sync::atomic::{AtomicBool, Ordering};
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();
        let owner: OwnerHandle = Arc::new(move |_c| called_clone.store(true, Ordering::SeqCst));
        let order = Order::new(Side::Buy, 10.0, 1, Some(owner));
        order.notify(Confirmation::Edited { order_id: order.id });
        assert!(called.load(Ordering::SeqCst));
    }
}
