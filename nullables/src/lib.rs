//! Nullable infrastructure for deterministic ledger testing.
//!
//! Each double honors the real collaborator's contract but keeps all state
//! in memory and under direct test control: time only advances when told
//! to, balances only move when the ledger moves them, and failures happen
//! exactly when scripted.

pub mod asset;
pub mod clock;
pub mod module;

pub use asset::NullAsset;
pub use clock::NullClock;
pub use module::{NullModuleBank, NullVotingModule};
