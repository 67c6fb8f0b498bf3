//! Modification stamps.
//!
//! Every root entity carries an [`UpdateSeq`] that is replaced with a fresh
//! value whenever the entity is mutated through its table. Values come from a
//! single process-wide monotonic clock, so the maximum over a set of stamps
//! changes whenever any member of the set changes.
//!
//! The clock is 64 bits wide and never wraps in practice; wraparound is not
//! handled.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static CLOCK: AtomicU64 = AtomicU64::new(1);

/// A point on the process-wide modification clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UpdateSeq(u64);

impl UpdateSeq {
    /// The stamp that precedes every stamp handed out by [`UpdateSeq::next`].
    pub const INITIAL: UpdateSeq = UpdateSeq(0);

    /// Draws a fresh stamp, strictly greater than every earlier one.
    pub fn next() -> Self {
        UpdateSeq(CLOCK.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_initial(self) -> bool {
        self.0 == 0
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UpdateSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamps_increase() {
        let a = UpdateSeq::next();
        let b = UpdateSeq::next();
        assert!(b > a);
        assert!(!a.is_initial());
        assert!(UpdateSeq::INITIAL < a);
        assert!(UpdateSeq::default().is_initial());
    }
}
