//! Per-participant stake position.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use stakegate_types::Amount;

/// A participant's locked balance and its unlocked portion.
///
/// Invariant on ledger-driven paths: `unlocked <= total_locked`.
/// The revoke path credits `unlocked` on the word of the external module
/// (see the vote router), so the invariant's upper bound is only as good
/// as the module allow-list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Position {
    /// Total balance held by the ledger for this participant. Decreases
    /// only when a matured withdrawal pays out or a migration leaves.
    pub total_locked: Amount,
    /// Portion available for delegation or withdrawal scheduling.
    pub unlocked: Amount,
}

impl Position {
    /// Credit a fresh deposit: both sub-balances grow by `amount`.
    pub fn credit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.total_locked = self
            .total_locked
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.unlocked = self
            .unlocked
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Spend from the unlocked portion (delegation, scheduling, migration).
    pub fn reduce_unlocked(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if amount > self.unlocked {
            return Err(LedgerError::InsufficientUnlocked {
                needed: amount.raw(),
                available: self.unlocked.raw(),
            });
        }
        self.unlocked = self
            .unlocked
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Return balance to the unlocked portion (revocation).
    pub fn increase_unlocked(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.unlocked = self
            .unlocked
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Remove paid-out or migrated balance from the total.
    pub fn reduce_locked(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.total_locked = self
            .total_locked
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.total_locked.is_zero() && self.unlocked.is_zero()
    }
}
