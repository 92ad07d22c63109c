//! Ledger-specific errors.

use crate::external::AssetError;
use stakegate_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient unlocked balance: need {needed}, available {available}")]
    InsufficientUnlocked { needed: u128, available: u128 },

    #[error("module {0} is not allowed for this action")]
    ModuleNotAllowed(Address),

    #[error("module {0} is allow-listed but not resolvable")]
    ModuleUnavailable(Address),

    #[error("successor {0} does not acknowledge this ledger as its migrator")]
    IncompatibleSuccessor(Address),

    #[error("caller {0} is not the configured migrator")]
    CallerNotMigrator(Address),

    #[error("no successor ledger is configured")]
    NoSuccessorConfigured,

    #[error("successor {expected} is configured, got {got}")]
    SuccessorMismatch { expected: Address, got: Address },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("epoch length must be non-zero")]
    InvalidEpochLength,

    #[error("another operation is already in progress on this ledger")]
    OperationInProgress,

    #[error("arithmetic overflow in balance computation")]
    Overflow,

    #[error("asset transfer failed: {0}")]
    Asset(#[from] AssetError),

    #[error("voting module {module} rejected the call: {reason}")]
    ModuleCall { module: Address, reason: String },

    #[error("snapshot decode failed: {0}")]
    Snapshot(String),
}
