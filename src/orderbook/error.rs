//! Order book error types.

use thiserror::Error;

/// Errors that can occur within the order book.
///
/// `cancel`/`edit` of an unknown or already-inactive order are *not*
/// represented here — per the spec those are plain `false` returns, not
/// errors, since "the order is gone" is an expected, common outcome.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OrderBookError {
    /// A price was supplied that is not a multiple of the configured tick size.
    #[error("invalid tick: price {price} is not a multiple of the tick size")]
    InvalidTick {
        /// The offending price.
        price: f64,
    },

    /// An edit or insert supplied a non-positive quantity.
    #[error("invalid quantity: {quantity} (must be >= 1)")]
    InvalidQuantity {
        /// The offending quantity.
        quantity: i64,
    },

    /// Internal consistency failure: an id was present in the by-id lookup
    /// but missing from its price level (or vice versa). Indicates a bug in
    /// the book, not a caller error.
    #[error("inconsistent book state for order {order_id}: {detail}")]
    Inconsistent {
        /// The order id involved.
        order_id: u64,
        /// What was inconsistent.
        detail: String,
    },
}
