//! Feed-wide sequence counter.
//!
//! Every wire message, regardless of kind, is stamped from one shared,
//! gapless, monotonically increasing counter — mirroring the reference
//! implementation's single `_seq_gen = itertools.count(1)`, shared by every
//! `send_*` function rather than kept per message type. A subscriber tracks
//! gaps against this one sequence, not one per message kind.

use std::sync::atomic::{AtomicU32, Ordering};

/// The single sequence counter shared by every record the feed emits.
#[derive(Default)]
pub struct FeedSequencer {
    counter: AtomicU32,
}

impl FeedSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sequence number in the shared stream.
    pub fn next(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}
