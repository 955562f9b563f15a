//! Convenience re-exports for consumers of this crate.

pub use crate::config::EngineConfig;
pub use crate::facade::Exchange;
pub use crate::feed::{FeedTransport, RecordingTransport, UdpMulticastTransport};
pub use crate::orderbook::{Confirmation, Order, OwnerHandle, Side, SubmitOutcome, SubmitRequest, Trade, Trend};
