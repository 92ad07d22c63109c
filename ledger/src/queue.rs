//! The withdrawal delay line — a fixed-depth, lazily normalized buffer.
//!
//! Each participant has `DELAY_EPOCHS` slots plus the epoch at which the
//! buffer was last normalized. `slot[i]` matures `i` epochs after that
//! mark; `slot[DELAY_EPOCHS - 1]` is always "scheduled this epoch". There
//! is no background scheduler: every access settles the buffer first by
//! claiming the matured prefix and shifting survivors toward maturity.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use stakegate_types::Amount;

/// Number of epochs a scheduled amount waits before it can be claimed.
pub const DELAY_EPOCHS: usize = 4;

/// A participant's scheduled-withdrawal buffer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalQueue {
    slots: [Amount; DELAY_EPOCHS],
    last_update_epoch: u64,
}

impl WithdrawalQueue {
    /// An empty queue stamped at `epoch`.
    pub fn new(epoch: u64) -> Self {
        Self {
            slots: [Amount::ZERO; DELAY_EPOCHS],
            last_update_epoch: epoch,
        }
    }

    pub fn last_update_epoch(&self) -> u64 {
        self.last_update_epoch
    }

    pub fn slots(&self) -> &[Amount; DELAY_EPOCHS] {
        &self.slots
    }

    /// Sum of everything still waiting in the buffer.
    pub fn total_queued(&self) -> Amount {
        // At most DELAY_EPOCHS values below the 96-bit cap; the raw u128
        // sum cannot overflow.
        let sum: u128 = self.slots.iter().map(|a| a.raw()).sum();
        Amount::try_new(sum).unwrap_or(Amount::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|a| a.is_zero())
    }

    /// Settle the buffer at `epoch_now`: claim every slot that matured
    /// since the last update, shift survivors toward maturity, and stamp
    /// the new epoch. Returns the claimed amount.
    ///
    /// `epoch_now == last_update_epoch` is a true no-op. A gap larger
    /// than the buffer claims the entire prior contents exactly once.
    pub fn normalize(&mut self, epoch_now: u64) -> Result<Amount, LedgerError> {
        // An earlier epoch can only come from a corrupted snapshot;
        // treated as no elapsed time.
        let diff = epoch_now.saturating_sub(self.last_update_epoch) as usize;
        if diff == 0 {
            return Ok(Amount::ZERO);
        }

        let mut claimed = Amount::ZERO;
        for i in 0..DELAY_EPOCHS.min(diff) {
            claimed = claimed
                .checked_add(self.slots[i])
                .ok_or(LedgerError::Overflow)?;
        }

        for i in 0..DELAY_EPOCHS {
            self.slots[i] = match i.checked_add(diff) {
                Some(src) if src < DELAY_EPOCHS => self.slots[src],
                _ => Amount::ZERO,
            };
        }

        self.last_update_epoch = epoch_now;
        Ok(claimed)
    }

    /// Schedule `amount` at `epoch_now`: normalize first (so the newest
    /// slot never holds stale cross-epoch content), then accumulate into
    /// it. Same-epoch schedules share one maturity. Returns the amount
    /// claimed by the implicit normalize.
    pub fn schedule(&mut self, epoch_now: u64, amount: Amount) -> Result<Amount, LedgerError> {
        let claimed = self.normalize(epoch_now)?;
        let bucket = &mut self.slots[DELAY_EPOCHS - 1];
        *bucket = bucket.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(claimed)
    }

    /// Read-only view of what `normalize(epoch_now)` would do: the amount
    /// claimable now and the post-shift buffer.
    pub fn preview(&self, epoch_now: u64) -> Result<(Amount, [Amount; DELAY_EPOCHS]), LedgerError> {
        let mut copy = self.clone();
        let claimable = copy.normalize(epoch_now)?;
        Ok((claimable, copy.slots))
    }
}
