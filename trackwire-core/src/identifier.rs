//! Per-frame data identifier sequencing
//!
//! Every ASCII frame carries a single-byte identifier the receiver uses for
//! correlation and deduplication. The identifier cycles through the closed
//! range `'A'..='z'` (0x41..=0x7A) and wraps back to `'A'`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Cyclic frame identifier generator
///
/// Owned explicitly by the caller and passed to the codec per frame; there
/// is no ambient global counter. Thread-safe and cheap to clone (clones
/// share the counter via `Arc`).
///
/// # Examples
///
/// ```
/// use trackwire_core::IdentifierSequencer;
///
/// let seq = IdentifierSequencer::new();
/// assert_eq!(seq.next(), b'A');
/// assert_eq!(seq.next(), b'B');
/// ```
#[derive(Debug, Clone)]
pub struct IdentifierSequencer {
    counter: Arc<AtomicU8>,
}

impl IdentifierSequencer {
    /// First identifier in the cycle ('A')
    pub const FIRST: u8 = 0x41;

    /// Last identifier in the cycle ('z')
    pub const LAST: u8 = 0x7A;

    /// Create a sequencer whose first identifier is `'A'`
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU8::new(Self::FIRST)),
        }
    }

    /// Return the current identifier and advance the counter
    ///
    /// The read-then-advance is a single CAS so concurrent producers never
    /// observe a duplicate or skipped identifier.
    pub fn next(&self) -> u8 {
        let mut current = self.counter.load(Ordering::Acquire);
        loop {
            let advanced = if current >= Self::LAST {
                Self::FIRST
            } else {
                current + 1
            };
            match self.counter.compare_exchange_weak(
                current,
                advanced,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return current,
                Err(observed) => current = observed,
            }
        }
    }

    /// Peek at the identifier the next call to [`next`](Self::next) returns
    pub fn peek(&self) -> u8 {
        self.counter.load(Ordering::Acquire)
    }
}

impl Default for IdentifierSequencer {
    fn default() -> Self {
        Self::new()
    }
}
