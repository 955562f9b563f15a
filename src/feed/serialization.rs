//! A debug-only JSON side channel for feed events.
//!
//! This is not part of the wire contract (§6.2) — it exists for logging,
//! local inspection, and integration tests that want to assert on events
//! without decoding binary records. Production subscribers only ever see
//! the fixed-layout records from [`super::codec`].

use serde::Serialize;

use crate::orderbook::EngineEvent;
use crate::orderbook::Side;

/// A JSON-friendly mirror of an [`EngineEvent`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum FeedEventRecord {
    New { order_id: u64, side: Side, price: f64, quantity: u32 },
    Trade { resting_order_id: u64, aggressor_order_id: u64, price: f64, quantity: u32 },
    CancelAck { order_id: u64, side: Side },
    Edited { order_id: u64, side: Side, price: f64, quantity: u32 },
    Rejected { reason: String },
}

impl From<&EngineEvent> for FeedEventRecord {
    fn from(event: &EngineEvent) -> Self {
        match event {
            EngineEvent::New { order_id, side, price, quantity } => {
                FeedEventRecord::New { order_id: *order_id, side: *side, price: *price, quantity: *quantity }
            }
            EngineEvent::Trade { trade } => FeedEventRecord::Trade {
                resting_order_id: trade.resting_order_id,
                aggressor_order_id: trade.aggressor_order_id,
                price: trade.price,
                quantity: trade.quantity,
            },
            EngineEvent::CancelAck { order_id, side } => {
                FeedEventRecord::CancelAck { order_id: *order_id, side: *side }
            }
            EngineEvent::Edited { order_id, side, price, quantity } => {
                FeedEventRecord::Edited { order_id: *order_id, side: *side, price: *price, quantity: *quantity }
            }
            EngineEvent::Rejected { reason } => FeedEventRecord::Rejected { reason: reason.clone() },
        }
    }
}

/// Something that can turn an [`EngineEvent`] into a serialized form for a
/// debug side channel.
pub trait EventSerializer: Send + Sync {
    fn serialize(&self, event: &EngineEvent) -> Result<String, serde_json::Error>;
}

/// The only [`EventSerializer`] this crate ships: plain JSON, one object per
/// line.
#[derive(Default)]
pub struct JsonEventSerializer;

impl EventSerializer for JsonEventSerializer {
    fn serialize(&self, event: &EngineEvent) -> Result<String, serde_json::Error> {
        serde_json::to_string(&FeedEventRecord::from(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::Trade;

    #[test]
    fn new_event_serializes_with_type_tag() {
        let serializer = JsonEventSerializer;
        let event = EngineEvent::New { order_id: 1, side: Side::Buy, price: 700.0, quantity: 5 };
        let json = serializer.serialize(&event).unwrap();
        assert!(json.contains("\"type\":\"New\""));
        assert!(json.contains("\"order_id\":1"));
    }

    #[test]
    fn trade_event_carries_both_order_ids() {
        let serializer = JsonEventSerializer;
        let trade = Trade::new(10, 20, Side::Buy, 5, 700.0);
        let event = EngineEvent::Trade { trade };
        let json = serializer.serialize(&event).unwrap();
        assert!(json.contains("\"resting_order_id\":10"));
        assert!(json.contains("\"aggressor_order_id\":20"));
    }
}
