//! The binary market-data feed: turns engine events into fixed-layout wire
//! records and publishes them over a loss-tolerant transport.

pub mod codec;
pub mod error;
pub mod sequencer;
pub mod serialization;
pub mod transport;

pub use codec::{MsgType, OrderRecord, RecordHeader, TradeRecord};
pub use error::FeedError;
pub use sequencer::FeedSequencer;
pub use serialization::{EventSerializer, FeedEventRecord, JsonEventSerializer};
pub use transport::{FeedTransport, RecordingTransport, UdpMulticastTransport};

use zerocopy::IntoBytes;

use crate::config::EngineConfig;
use crate::orderbook::{EngineEvent, Side};

/// Subscribes to [`EngineEvent`]s and publishes the corresponding wire
/// record to a [`FeedTransport`]. One instance per instrument stream.
pub struct FeedPublisher<T: FeedTransport> {
    transport: T,
    sequencer: FeedSequencer,
    stream_id: u16,
    token: u32,
    price_multiplier: u32,
}

impl<T: FeedTransport> FeedPublisher<T> {
    pub fn new(transport: T, config: &EngineConfig) -> Self {
        FeedPublisher {
            transport,
            sequencer: FeedSequencer::new(),
            stream_id: config.stream_id,
            token: config.token,
            price_multiplier: config.price_multiplier,
        }
    }

    /// Encodes and publishes `event`. Encoding or transport failures are
    /// logged and swallowed — a feed publication problem never fails the
    /// submission that produced the event.
    pub fn publish(&self, event: &EngineEvent) {
        if let Err(err) = self.try_publish(event) {
            tracing::warn!(error = %err, "failed to publish feed record");
        }
    }

    fn try_publish(&self, event: &EngineEvent) -> Result<(), FeedError> {
        match event {
            EngineEvent::New { order_id, side, price, quantity } => {
                let record = codec::build_order_record(
                    self.stream_id,
                    self.sequencer.next(),
                    MsgType::New,
                    self.token,
                    *order_id,
                    *side,
                    *price,
                    *quantity,
                    self.price_multiplier,
                    crate::utils::current_time_ns(),
                )?;
                self.transport.send(record.as_bytes())
            }
            EngineEvent::Trade { trade } => {
                let (buy_order_id, sell_order_id) = match trade.aggressor_side {
                    Side::Buy => (trade.aggressor_order_id, trade.resting_order_id),
                    Side::Sell => (trade.resting_order_id, trade.aggressor_order_id),
                };
                let record = codec::build_trade_record(
                    self.stream_id,
                    self.sequencer.next(),
                    self.token,
                    buy_order_id,
                    sell_order_id,
                    trade.price,
                    trade.quantity,
                    self.price_multiplier,
                    trade.timestamp_ns,
                )?;
                self.transport.send(record.as_bytes())
            }
            EngineEvent::CancelAck { order_id, side } => {
                let record = codec::build_order_record(
                    self.stream_id,
                    self.sequencer.next(),
                    MsgType::CancelAck,
                    self.token,
                    *order_id,
                    *side,
                    0.0,
                    0,
                    self.price_multiplier,
                    crate::utils::current_time_ns(),
                )?;
                self.transport.send(record.as_bytes())
            }
            EngineEvent::Edited { order_id, side, price, quantity } => {
                let record = codec::build_order_record(
                    self.stream_id,
                    self.sequencer.next(),
                    MsgType::Edit,
                    self.token,
                    *order_id,
                    *side,
                    *price,
                    *quantity,
                    self.price_multiplier,
                    crate::utils::current_time_ns(),
                )?;
                self.transport.send(record.as_bytes())
            }
            EngineEvent::Rejected { reason } => {
                tracing::info!(reason = %reason, "submission rejected");
                // No order id exists yet for a rejected submission; the feed
                // still owes a record (§6.2's `MsgType::Reject`), so it goes
                // out with a zeroed id/price/quantity payload.
                let record = codec::build_order_record(
                    self.stream_id,
                    self.sequencer.next(),
                    MsgType::Reject,
                    self.token,
                    0,
                    Side::Buy,
                    0.0,
                    0,
                    self.price_multiplier,
                    crate::utils::current_time_ns(),
                )?;
                self.transport.send(record.as_bytes())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::{Side, Trade};
    use std::sync::Arc;

    #[test]
    fn new_event_produces_one_record() {
        let config = EngineConfig::default();
        let transport = Arc::new(RecordingTransport::new());
        let publisher = FeedPublisher::new(RecordingTransportHandle(transport.clone()), &config);
        publisher.publish(&EngineEvent::New { order_id: 5, side: Side::Buy, price: 700.0, quantity: 10 });
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn trade_event_produces_one_record() {
        let config = EngineConfig::default();
        let transport = Arc::new(RecordingTransport::new());
        let publisher = FeedPublisher::new(RecordingTransportHandle(transport.clone()), &config);
        let trade = Trade::new(1, 2, Side::Buy, 5, 700.0);
        publisher.publish(&EngineEvent::Trade { trade });
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn rejection_publishes_a_reject_record() {
        let config = EngineConfig::default();
        let transport = Arc::new(RecordingTransport::new());
        let publisher = FeedPublisher::new(RecordingTransportHandle(transport.clone()), &config);
        publisher.publish(&EngineEvent::Rejected { reason: "nope".into() });
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn trade_record_assigns_buy_and_sell_ids_by_side() {
        let config = EngineConfig::default();
        let transport = Arc::new(RecordingTransport::new());
        let publisher = FeedPublisher::new(RecordingTransportHandle(transport.clone()), &config);

        // Aggressor is a sell hitting a resting buy: resting order is the buyer.
        let trade = Trade::new(1, 2, Side::Sell, 5, 700.0);
        publisher.publish(&EngineEvent::Trade { trade });
        let sent = transport.sent();
        let record = codec::decode_trade_record(&sent[0]).unwrap();
        assert_eq!(record.buy_order_id, 1.0);
        assert_eq!(record.sell_order_id, 2.0);
    }

    struct RecordingTransportHandle(Arc<RecordingTransport>);

    impl FeedTransport for RecordingTransportHandle {
        fn send(&self, bytes: &[u8]) -> Result<(), FeedError> {
            self.0.send(bytes)
        }
    }
}
