//! Errors raised by the market-data feed codec and transport.

use thiserror::Error;

/// Errors that can occur while encoding, decoding, or publishing a feed record.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedError {
    /// A value that should fit in the wire field's integer width does not.
    #[error("field `{field}` value {value} does not fit in its wire width")]
    FieldOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The value that failed to fit.
        value: u64,
    },

    /// A buffer handed to the decoder was the wrong size for the record type.
    #[error("buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall {
        /// Minimum bytes required.
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },

    /// The underlying transport failed to send a datagram. Feed delivery is
    /// loss-tolerant by design (consumers detect gaps via the sequence
    /// number), so this is logged by callers rather than propagated as a
    /// submission failure.
    #[error("feed transport error: {0}")]
    Transport(#[from] std::io::Error),
}
