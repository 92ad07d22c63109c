//! Interfaces to external collaborators.
//!
//! The ledger never owns its collaborators; operations receive them as
//! trait objects. Crossing into a module or successor is a trust-boundary
//! crossing, not a concurrency boundary — the callee runs synchronously
//! and the ledger's operation flag stays held for the whole call.

use serde::{Deserialize, Serialize};
use stakegate_types::{Address, Amount, Timestamp};
use thiserror::Error;

/// Failures reported by the underlying asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("account {0} has insufficient funds")]
    InsufficientFunds(Address),

    #[error("spender {spender} lacks allowance from {owner}")]
    InsufficientAllowance { owner: Address, spender: Address },

    #[error("authorization proof rejected: {0}")]
    AuthorizationRejected(String),

    #[error("{0}")]
    Other(String),
}

/// A detached pre-authorization for an allowance, consumable once.
///
/// Consumption is best-effort on the deposit path: a stale or already-used
/// proof is swallowed because a standing allowance may still cover the pull.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorizationProof {
    pub owner: Address,
    pub spender: Address,
    pub amount: Amount,
    pub deadline: Timestamp,
    pub signature: Vec<u8>,
}

/// The underlying transferable-balance asset.
pub trait Asset {
    /// Move `amount` from `from` to `to`, consuming `to`'s allowance
    /// granted by `from` when the two differ from the caller.
    fn pull(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), AssetError>;

    /// Move `amount` out of `from` to `to` directly.
    fn push(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), AssetError>;

    /// Grant `spender` an allowance of `amount` over `owner`'s balance.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount)
        -> Result<(), AssetError>;

    /// Consume a detached authorization proof, installing the allowance it
    /// carries. One-shot; a replay must fail.
    fn apply_authorization(&mut self, proof: &AuthorizationProof) -> Result<(), AssetError>;
}

/// An external decision module receiving delegated voting weight.
///
/// The ledger trusts a module to track what each participant delegated
/// through it; a revoke is honored without cross-checking.
pub trait VotingModule {
    fn delegate(
        &mut self,
        participant: &Address,
        amount: Amount,
        extra: &[u8],
    ) -> Result<(), String>;

    fn revoke(
        &mut self,
        participant: &Address,
        amount: Amount,
        extra: &[u8],
    ) -> Result<(), String>;
}

/// Resolves an allow-listed module identity to its implementation.
pub trait ModuleBank {
    fn module(&mut self, id: &Address) -> Option<&mut dyn VotingModule>;
}
