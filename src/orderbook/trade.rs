//! Trade records produced by the matching engine.

use super::order::Side;
use crate::utils;

/// A single match between a resting order and an aggressing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    /// Unique id for this trade, drawn from a UUID v4 generator. Internal
    /// bookkeeping only — never placed on the wire.
    pub id: uuid::Uuid,
    /// Id of the order already resting in the book.
    pub resting_order_id: u64,
    /// Id of the order that crossed the spread to cause this match.
    pub aggressor_order_id: u64,
    /// Side of the aggressor. The resting order is on the opposite side.
    pub aggressor_side: Side,
    /// Quantity filled in this match.
    pub quantity: u32,
    /// Execution price, after slippage has been applied.
    pub price: f64,
    /// Nanosecond timestamp of execution.
    pub timestamp_ns: u64,
}

impl Trade {
    pub fn new(resting_order_id: u64, aggressor_order_id: u64, aggressor_side: Side, quantity: u32, price: f64) -> Self {
        Trade {
            id: uuid::Uuid::new_v4(),
            resting_order_id,
            aggressor_order_id,
            aggressor_side,
            quantity,
            price,
            timestamp_ns: utils::current_time_ns(),
        }
    }
}
