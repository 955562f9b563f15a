//! The order book and matching engine: everything needed to accept, rest,
//! match, cancel, and edit orders for a single instrument.

pub mod book;
pub mod circuit;
pub mod error;
pub mod level;
pub mod matching;
pub mod order;
pub mod trade;
pub mod trend;

pub use book::OrderBook;
pub use circuit::CircuitBreaker;
pub use error::OrderBookError;
pub use matching::{EngineEvent, EventSink, MatchingEngine, SubmitOutcome, SubmitRequest};
pub use order::{Confirmation, Order, OwnerHandle, Side};
pub use trade::Trade;
pub use trend::{Trend, TrendIndicator};
