//! Epoch arithmetic — pure mapping from wall time to an epoch counter.

use serde::{Deserialize, Serialize};
use stakegate_types::Timestamp;

/// Pure epoch clock: epoch 0 before `start`, then epoch 1 at `start` and
/// one increment at every further multiple of `epoch_length_secs`.
///
/// No mutable state; monotone non-decreasing as wall time advances.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EpochClock {
    start: Timestamp,
    epoch_length_secs: u64,
}

impl EpochClock {
    /// Build a clock. Callers validate a non-zero epoch length beforehand
    /// (see `LedgerConfig::new`).
    pub(crate) fn new_unchecked(start: Timestamp, epoch_length_secs: u64) -> Self {
        debug_assert!(epoch_length_secs > 0);
        Self {
            start,
            epoch_length_secs,
        }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn epoch_length_secs(&self) -> u64 {
        self.epoch_length_secs
    }

    /// The epoch counter at `now`.
    pub fn epoch_at(&self, now: Timestamp) -> u64 {
        if now < self.start {
            return 0;
        }
        1 + self.start.elapsed_since(now) / self.epoch_length_secs
    }
}
