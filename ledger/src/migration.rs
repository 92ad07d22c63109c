//! One-way migration of a position to a successor ledger instance.
//!
//! Migration bypasses the delay line: the amount leaves `unlocked` and
//! `total_locked` immediately, the successor is pre-authorized to pull the
//! underlying asset, and the position re-appears there through
//! `deposit_on_behalf`. The bidirectional migrator check runs at
//! configuration time (`set_successor`), so a migration can never target
//! a ledger that would refuse the hand-off.

use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::external::{Asset, ModuleBank};
use crate::ledger::StakeLedger;
use crate::votes::{self, VoteInstruction};
use stakegate_types::{Address, Amount, Timestamp};

/// The receiving side of a migration.
///
/// `StakeLedger` implements this for real successor instances; tests use
/// doubles to exercise the handshake failures.
pub trait MigrationTarget {
    /// The target ledger's identity.
    fn identity(&self) -> &Address;

    /// The identity the target accepts `deposit_on_behalf` calls from.
    fn migrator_identity(&self) -> Option<&Address>;

    fn deposit_on_behalf(
        &mut self,
        asset: &mut dyn Asset,
        modules: &mut dyn ModuleBank,
        caller: &Address,
        on_behalf_of: &Address,
        amount: Amount,
        instructions: &[VoteInstruction],
        now: Timestamp,
    ) -> Result<(), LedgerError>;
}

impl StakeLedger {
    /// Accept a candidate successor after the bidirectional check: the
    /// candidate must already name this ledger as its migrator.
    pub fn set_successor(&mut self, candidate: &dyn MigrationTarget) -> Result<(), LedgerError> {
        if candidate.migrator_identity() != Some(&self.config.identity) {
            return Err(LedgerError::IncompatibleSuccessor(candidate.identity().clone()));
        }
        let successor = candidate.identity().clone();
        tracing::info!(successor = %successor, "successor changed");
        self.config.successor = Some(successor.clone());
        self.events.emit(&LedgerEvent::SuccessorChanged { successor });
        Ok(())
    }

    /// Move `amount` of the participant's position to the configured
    /// successor, applying `pre_instructions` here first (typically
    /// revokes that free the balance) and forwarding `post_instructions`
    /// for the successor to apply on arrival.
    #[allow(clippy::too_many_arguments)]
    pub fn migrate(
        &mut self,
        asset: &mut dyn Asset,
        modules: &mut dyn ModuleBank,
        successor: &mut dyn MigrationTarget,
        participant: &Address,
        amount: Amount,
        pre_instructions: &[VoteInstruction],
        post_instructions: &[VoteInstruction],
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let _guard = self.flag.enter()?;
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let expected = self
            .config
            .successor
            .clone()
            .ok_or(LedgerError::NoSuccessorConfigured)?;
        if &expected != successor.identity() {
            return Err(LedgerError::SuccessorMismatch {
                expected,
                got: successor.identity().clone(),
            });
        }
        tracing::info!(
            participant = %participant,
            amount = %amount,
            successor = %expected,
            "migrating out"
        );

        self.settle(asset, participant, participant, now)?;
        self.run_rolled_back(participant, |ledger, pending| {
            let registry = &ledger.registry;
            let position = ledger.positions.entry(participant.clone()).or_default();
            votes::apply_batch(
                registry,
                modules,
                participant,
                position,
                pre_instructions,
                pending,
            )?;
            position.reduce_unlocked(amount)?;
            position.reduce_locked(amount)?;
            asset.approve(&ledger.config.identity, &expected, amount)?;
            if let Err(e) = successor.deposit_on_behalf(
                asset,
                modules,
                &ledger.config.identity,
                participant,
                amount,
                post_instructions,
                now,
            ) {
                // A failed hand-off must not leave the successor with a
                // standing allowance over the vault account.
                asset.approve(&ledger.config.identity, &expected, Amount::ZERO)?;
                return Err(e);
            }
            pending.push(LedgerEvent::MigratedOut {
                participant: participant.clone(),
                amount,
                successor: expected.clone(),
            });
            Ok(())
        })
    }

    /// Receive a migrated position. Only the configured migrator may call
    /// this; it behaves as a deposit pulled from the migrator's asset
    /// account, followed by the forwarded vote batch.
    #[allow(clippy::too_many_arguments)]
    pub fn deposit_on_behalf(
        &mut self,
        asset: &mut dyn Asset,
        modules: &mut dyn ModuleBank,
        caller: &Address,
        on_behalf_of: &Address,
        amount: Amount,
        instructions: &[VoteInstruction],
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let _guard = self.flag.enter()?;
        if self.config.migrator.as_ref() != Some(caller) {
            return Err(LedgerError::CallerNotMigrator(caller.clone()));
        }
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        tracing::info!(
            participant = %on_behalf_of,
            amount = %amount,
            migrator = %caller,
            "deposit on behalf"
        );

        self.settle(asset, on_behalf_of, on_behalf_of, now)?;
        self.run_rolled_back(on_behalf_of, |ledger, pending| {
            let registry = &ledger.registry;
            let position = ledger.positions.entry(on_behalf_of.clone()).or_default();
            position.credit(amount)?;
            pending.push(LedgerEvent::DepositedOnBehalf {
                participant: on_behalf_of.clone(),
                amount,
                migrator: caller.clone(),
            });
            votes::apply_batch(
                registry,
                modules,
                on_behalf_of,
                position,
                instructions,
                pending,
            )?;
            asset.pull(caller, &ledger.config.identity, amount)?;
            Ok(())
        })
    }
}

impl MigrationTarget for StakeLedger {
    fn identity(&self) -> &Address {
        &self.config.identity
    }

    fn migrator_identity(&self) -> Option<&Address> {
        self.config.migrator.as_ref()
    }

    fn deposit_on_behalf(
        &mut self,
        asset: &mut dyn Asset,
        modules: &mut dyn ModuleBank,
        caller: &Address,
        on_behalf_of: &Address,
        amount: Amount,
        instructions: &[VoteInstruction],
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        StakeLedger::deposit_on_behalf(
            self,
            asset,
            modules,
            caller,
            on_behalf_of,
            amount,
            instructions,
            now,
        )
    }
}
