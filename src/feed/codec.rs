//! Fixed-layout binary wire records for the market-data feed.
//!
//! Every record opens with a common header (stream id, sequence number,
//! message type) followed by one of two payload shapes: an order-shaped
//! payload (new/cancel/cancel-ack/edit/reject) or a trade-shaped payload.
//! Prices travel as integer "paise" — the decimal price multiplied by the
//! configured [`crate::config::EngineConfig::price_multiplier`] — so the
//! wire format never carries floating point.
//!
//! Records are `repr(C, packed)` and derive `zerocopy`'s `FromBytes` /
//! `IntoBytes`, so encoding is just a field-by-field struct literal and
//! decoding is a zero-copy cast over a byte slice — no hand-rolled
//! byte-offset arithmetic.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::FeedError;
use crate::orderbook::Side;

/// Wire tags for each record's `msg_type` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    New = b'N',
    Trade = b'T',
    Cancel = b'X',
    CancelAck = b'K',
    Edit = b'E',
    Reject = b'R',
}

/// Common to every record: which stream, which position in that stream's
/// sequence, and what kind of record follows.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct RecordHeader {
    pub stream_id: u16,
    pub sequence: u32,
    pub msg_type: u8,
}

/// Payload shape used for new orders, cancels, cancel acks, edits, and
/// rejects — anything describing a single order's state.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct OrderRecord {
    pub header: RecordHeader,
    pub token: u32,
    pub order_id: f64,
    pub side: u8,
    pub price: u32,
    pub quantity: u32,
    pub timestamp_ns: u64,
}

/// Payload shape used for trade prints.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct TradeRecord {
    pub header: RecordHeader,
    pub token: u32,
    pub buy_order_id: f64,
    pub sell_order_id: f64,
    pub price: u32,
    pub quantity: u32,
    pub timestamp_ns: u64,
}

/// Converts a decimal price into the integer "paise" representation carried
/// on the wire, rejecting values that would not survive the round trip.
pub fn price_to_paise(price: f64, multiplier: u32) -> Result<u32, FeedError> {
    let scaled = (price * multiplier as f64).round();
    if scaled < 0.0 || scaled > u32::MAX as f64 {
        return Err(FeedError::FieldOutOfRange { field: "price", value: scaled.max(0.0) as u64 });
    }
    Ok(scaled as u32)
}

#[allow(clippy::too_many_arguments)]
pub fn build_order_record(
    stream_id: u16,
    sequence: u32,
    msg_type: MsgType,
    token: u32,
    order_id: u64,
    side: Side,
    price: f64,
    quantity: u32,
    price_multiplier: u32,
    timestamp_ns: u64,
) -> Result<OrderRecord, FeedError> {
    Ok(OrderRecord {
        header: RecordHeader { stream_id, sequence, msg_type: msg_type as u8 },
        token,
        order_id: order_id as f64,
        side: side.as_byte(),
        price: price_to_paise(price, price_multiplier)?,
        quantity,
        timestamp_ns,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn build_trade_record(
    stream_id: u16,
    sequence: u32,
    token: u32,
    buy_order_id: u64,
    sell_order_id: u64,
    price: f64,
    quantity: u32,
    price_multiplier: u32,
    timestamp_ns: u64,
) -> Result<TradeRecord, FeedError> {
    Ok(TradeRecord {
        header: RecordHeader { stream_id, sequence, msg_type: MsgType::Trade as u8 },
        token,
        buy_order_id: buy_order_id as f64,
        sell_order_id: sell_order_id as f64,
        price: price_to_paise(price, price_multiplier)?,
        quantity,
        timestamp_ns,
    })
}

/// Decodes an [`OrderRecord`] from a raw datagram payload.
pub fn decode_order_record(bytes: &[u8]) -> Result<OrderRecord, FeedError> {
    OrderRecord::read_from_bytes(bytes).map_err(|_| FeedError::BufferTooSmall {
        expected: std::mem::size_of::<OrderRecord>(),
        actual: bytes.len(),
    })
}

/// Decodes a [`TradeRecord`] from a raw datagram payload.
pub fn decode_trade_record(bytes: &[u8]) -> Result<TradeRecord, FeedError> {
    TradeRecord::read_from_bytes(bytes).map_err(|_| FeedError::BufferTooSmall {
        expected: std::mem::size_of::<TradeRecord>(),
        actual: bytes.len(),
    })
}
