//! A simulated single-symbol continuous double-auction exchange.
//!
//! This crate provides a price/time-priority order book, a matching engine
//! with a daily price band, a circuit breaker, a trading execution range
//! gate, and trade-price slippage, plus a fixed-layout binary market-data
//! feed. Everything is reachable through [`Exchange`], the composition root
//! that wires the book, the matching engine, and the feed together.
//!
//! ```no_run
//! use auction_exchange::{Exchange, EngineConfig, Side};
//! use auction_exchange::feed::RecordingTransport;
//!
//! let exchange = Exchange::new(EngineConfig::default(), RecordingTransport::new());
//! exchange.submit(Side::Buy, 700.05, 10, None);
//! ```

pub mod config;
pub mod facade;
pub mod feed;
pub mod orderbook;
pub mod prelude;
pub mod utils;

pub use config::EngineConfig;
pub use facade::Exchange;
pub use orderbook::{Confirmation, Order, OwnerHandle, Side, SubmitOutcome, Trend};
