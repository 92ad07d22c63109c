//! stakegate ledger — stake, delegate, and withdraw with a delay.
//!
//! A participant locks a fungible balance ([`StakeLedger::deposit`]),
//! delegates voting weight backed by the unlocked portion to allow-listed
//! external modules ([`StakeLedger::apply_votes`]), and unlocks through a
//! fixed-depth epoch delay line ([`StakeLedger::withdraw`] /
//! [`StakeLedger::claim_matured`]). A configured successor ledger can
//! receive whole positions immediately, bypassing the delay
//! ([`StakeLedger::migrate`]).
//!
//! The ledger owns no clock and no collaborators: operations take
//! `now: Timestamp` plus the asset / module-bank trait objects, which
//! keeps the core deterministic and testable.

pub mod config;
pub mod epoch;
pub mod error;
pub mod events;
pub mod external;
pub mod guard;
pub mod ledger;
pub mod migration;
pub mod position;
pub mod queue;
pub mod registry;
pub mod snapshot;
pub mod votes;

pub use config::LedgerConfig;
pub use epoch::EpochClock;
pub use error::LedgerError;
pub use events::{EventBus, LedgerEvent};
pub use external::{Asset, AssetError, AuthorizationProof, ModuleBank, VotingModule};
pub use ledger::{LedgerSummary, StakeLedger};
pub use migration::MigrationTarget;
pub use position::Position;
pub use queue::{WithdrawalQueue, DELAY_EPOCHS};
pub use registry::{ModuleRegistry, ModuleStatus};
pub use votes::{VoteAction, VoteInstruction};
