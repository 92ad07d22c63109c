//! Ledger instance configuration.

use crate::epoch::EpochClock;
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use stakegate_types::{Address, Timestamp};

/// Process-wide configuration for one ledger instance.
///
/// Epoch parameters are fixed at construction; the successor and migrator
/// identities change through the owner-gated setters on the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// This instance's own identity; asset pulls into the ledger target it.
    pub identity: Address,
    pub clock: EpochClock,
    /// The ledger positions may migrate out to, once configured.
    pub successor: Option<Address>,
    /// The only identity allowed to call `deposit_on_behalf` here.
    pub migrator: Option<Address>,
}

impl LedgerConfig {
    pub fn new(
        identity: Address,
        epoch_start: Timestamp,
        epoch_length_secs: u64,
    ) -> Result<Self, LedgerError> {
        if epoch_length_secs == 0 {
            return Err(LedgerError::InvalidEpochLength);
        }
        Ok(Self {
            identity,
            clock: EpochClock::new_unchecked(epoch_start, epoch_length_secs),
            successor: None,
            migrator: None,
        })
    }
}
