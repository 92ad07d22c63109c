//! The stake ledger facade — every public operation lives here or in the
//! migration impl block (`migration.rs`).
//!
//! Operation shape, shared by all mutating entry points:
//! 1. acquire the reentrancy flag, validate arguments;
//! 2. settle the participant's matured unlocks (lazy delay-line
//!    normalization); the settlement commits on its own — it would have
//!    happened in whichever operation touched the participant first;
//! 3. run the operation proper against a snapshot of the participant's
//!    local state, buffering events; an error restores the snapshot and
//!    emits nothing.
//!
//! Asset pulls are ordered after local mutations inside step 3, so a
//! failing operation never leaves participant funds stranded in the
//! ledger's asset account. Module callbacks that already ran before a
//! mid-batch failure are outside the rollback boundary (accepted trust
//! risk of the module allow-list).

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::events::{EventBus, LedgerEvent};
use crate::external::{Asset, AuthorizationProof, ModuleBank};
use crate::guard::OperationFlag;
use crate::position::Position;
use crate::queue::{WithdrawalQueue, DELAY_EPOCHS};
use crate::registry::{ModuleRegistry, ModuleStatus};
use crate::votes::{self, VoteInstruction};
use stakegate_types::{Address, Amount, Timestamp};
use std::collections::HashMap;

/// One ledger instance: per-participant positions and delay lines, the
/// module allow-list, and the instance wiring (successor / migrator).
pub struct StakeLedger {
    pub(crate) config: LedgerConfig,
    pub(crate) positions: HashMap<Address, Position>,
    pub(crate) queues: HashMap<Address, WithdrawalQueue>,
    pub(crate) registry: ModuleRegistry,
    pub(crate) events: EventBus,
    pub(crate) flag: OperationFlag,
}

/// Summary statistics for one ledger instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSummary {
    pub participants: u64,
    pub total_locked: Amount,
    pub total_queued: Amount,
}

impl StakeLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            positions: HashMap::new(),
            queues: HashMap::new(),
            registry: ModuleRegistry::new(),
            events: EventBus::new(),
            flag: OperationFlag::new(),
        }
    }

    pub fn identity(&self) -> &Address {
        &self.config.identity
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Register a listener for every future event.
    pub fn subscribe(&mut self, listener: impl Fn(&LedgerEvent) + Send + Sync + 'static) {
        self.events.subscribe(listener);
    }

    // ── Read operations ──────────────────────────────────────────────────

    pub fn current_epoch(&self, now: Timestamp) -> u64 {
        self.config.clock.epoch_at(now)
    }

    pub fn locked_balance(&self, participant: &Address) -> Amount {
        self.positions
            .get(participant)
            .map(|p| p.total_locked)
            .unwrap_or(Amount::ZERO)
    }

    pub fn unlocked_balance(&self, participant: &Address) -> Amount {
        self.positions
            .get(participant)
            .map(|p| p.unlocked)
            .unwrap_or(Amount::ZERO)
    }

    /// What `claim_matured` would pay right now, and the buffer as it
    /// would look afterwards. Read-only.
    pub fn preview_claimable(
        &self,
        participant: &Address,
        now: Timestamp,
    ) -> Result<(Amount, [Amount; DELAY_EPOCHS]), LedgerError> {
        match self.queues.get(participant) {
            Some(q) => q.preview(self.current_epoch(now)),
            None => Ok((Amount::ZERO, [Amount::ZERO; DELAY_EPOCHS])),
        }
    }

    /// Total still waiting in the participant's delay line (pre-normalize).
    pub fn queued_total(&self, participant: &Address) -> Amount {
        self.queues
            .get(participant)
            .map(|q| q.total_queued())
            .unwrap_or(Amount::ZERO)
    }

    pub fn module_status(&self, module: &Address) -> ModuleStatus {
        self.registry.status(module)
    }

    pub fn successor(&self) -> Option<&Address> {
        self.config.successor.as_ref()
    }

    pub fn migrator(&self) -> Option<&Address> {
        self.config.migrator.as_ref()
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut total_locked = Amount::ZERO;
        for p in self.positions.values() {
            total_locked = total_locked
                .checked_add(p.total_locked)
                .unwrap_or(Amount::MAX);
        }
        let mut total_queued = Amount::ZERO;
        for q in self.queues.values() {
            total_queued = total_queued
                .checked_add(q.total_queued())
                .unwrap_or(Amount::MAX);
        }
        LedgerSummary {
            participants: self.positions.len() as u64,
            total_locked,
            total_queued,
        }
    }

    // ── Mutating operations ──────────────────────────────────────────────

    /// Lock `amount` for `participant` and apply a vote batch in the same
    /// call. The participant must have granted this ledger an allowance
    /// covering the pull.
    pub fn deposit(
        &mut self,
        asset: &mut dyn Asset,
        modules: &mut dyn ModuleBank,
        participant: &Address,
        amount: Amount,
        instructions: &[VoteInstruction],
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let _guard = self.flag.enter()?;
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        tracing::debug!(participant = %participant, amount = %amount, "deposit");

        self.settle(asset, participant, participant, now)?;
        self.run_rolled_back(participant, |ledger, pending| {
            let registry = &ledger.registry;
            let position = ledger.positions.entry(participant.clone()).or_default();
            position.credit(amount)?;
            pending.push(LedgerEvent::Deposited {
                participant: participant.clone(),
                amount,
            });
            votes::apply_batch(registry, modules, participant, position, instructions, pending)?;
            asset.pull(participant, &ledger.config.identity, amount)?;
            Ok(())
        })
    }

    /// Same as [`deposit`](Self::deposit), but first tries to consume a
    /// detached authorization proof for the allowance. A failed proof is
    /// swallowed — a standing allowance may already cover the pull.
    #[allow(clippy::too_many_arguments)]
    pub fn deposit_with_authorization(
        &mut self,
        asset: &mut dyn Asset,
        modules: &mut dyn ModuleBank,
        participant: &Address,
        amount: Amount,
        instructions: &[VoteInstruction],
        proof: &AuthorizationProof,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if let Err(e) = asset.apply_authorization(proof) {
            tracing::warn!(
                participant = %participant,
                error = %e,
                "authorization proof rejected, relying on standing allowance"
            );
        }
        self.deposit(asset, modules, participant, amount, instructions, now)
    }

    /// Apply a vote batch, pay out matured unlocks to `recipient`, then
    /// schedule `amount` into the delay line. The scheduled amount leaves
    /// the unlocked portion immediately; it pays out once it has waited
    /// the full delay.
    #[allow(clippy::too_many_arguments)]
    pub fn withdraw(
        &mut self,
        asset: &mut dyn Asset,
        modules: &mut dyn ModuleBank,
        participant: &Address,
        amount: Amount,
        recipient: &Address,
        instructions: &[VoteInstruction],
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let _guard = self.flag.enter()?;
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        tracing::debug!(participant = %participant, amount = %amount, "withdraw");

        let epoch_now = self.current_epoch(now);
        self.settle(asset, participant, recipient, now)?;
        self.run_rolled_back(participant, |ledger, pending| {
            let registry = &ledger.registry;
            let position = ledger
                .positions
                .entry(participant.clone())
                .or_default();
            votes::apply_batch(registry, modules, participant, position, instructions, pending)?;
            position.reduce_unlocked(amount)?;
            let queue = ledger
                .queues
                .entry(participant.clone())
                .or_insert_with(|| WithdrawalQueue::new(epoch_now));
            // Settle already normalized this epoch, so this cannot claim.
            queue.schedule(epoch_now, amount)?;
            pending.push(LedgerEvent::WithdrawalScheduled {
                participant: participant.clone(),
                amount,
                matures_at_epoch: epoch_now + DELAY_EPOCHS as u64,
            });
            Ok(())
        })
    }

    /// Pay out whatever has matured. Calling again in the same epoch is a
    /// true no-op: no transfer, no event, no state write.
    pub fn claim_matured(
        &mut self,
        asset: &mut dyn Asset,
        participant: &Address,
        recipient: &Address,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        let _guard = self.flag.enter()?;
        self.settle(asset, participant, recipient, now)
    }

    /// Apply a vote batch only. Matured unlocks settle to the participant
    /// first, like every other operation.
    pub fn apply_votes(
        &mut self,
        asset: &mut dyn Asset,
        modules: &mut dyn ModuleBank,
        participant: &Address,
        instructions: &[VoteInstruction],
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let _guard = self.flag.enter()?;
        self.settle(asset, participant, participant, now)?;
        self.run_rolled_back(participant, |ledger, pending| {
            let registry = &ledger.registry;
            let position = ledger
                .positions
                .entry(participant.clone())
                .or_default();
            votes::apply_batch(registry, modules, participant, position, instructions, pending)
        })
    }

    // ── Admin operations ─────────────────────────────────────────────────
    //
    // Owner gating lives in the access-control layer wrapping this ledger;
    // these are the raw setters it drives.

    pub fn set_module_status(&mut self, module: Address, status: ModuleStatus) {
        tracing::info!(module = %module, status = status.name(), "module status changed");
        self.registry.set_status(module.clone(), status);
        self.events
            .emit(&LedgerEvent::ModuleStatusChanged { module, status });
    }

    pub fn set_migrator(&mut self, migrator: Address) {
        tracing::info!(migrator = %migrator, "migrator changed");
        self.config.migrator = Some(migrator.clone());
        self.events.emit(&LedgerEvent::MigratorChanged { migrator });
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Normalize the participant's delay line and pay out anything that
    /// matured. Atomic: either the queue shift, the balance reduction,
    /// and the transfer all happen, or none do.
    pub(crate) fn settle(
        &mut self,
        asset: &mut dyn Asset,
        participant: &Address,
        recipient: &Address,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        let epoch_now = self.config.clock.epoch_at(now);
        let Some(queue) = self.queues.get(participant) else {
            return Ok(Amount::ZERO);
        };

        let mut staged_queue = queue.clone();
        let claimed = staged_queue.normalize(epoch_now)?;
        if claimed.is_zero() {
            // Commit the stamp/shift only if an epoch boundary passed.
            if staged_queue.last_update_epoch() != queue.last_update_epoch() {
                self.queues.insert(participant.clone(), staged_queue);
            }
            return Ok(Amount::ZERO);
        }

        let mut staged_position = self
            .positions
            .get(participant)
            .cloned()
            .unwrap_or_default();
        staged_position.reduce_locked(claimed)?;
        asset.push(&self.config.identity, recipient, claimed)?;

        self.queues.insert(participant.clone(), staged_queue);
        self.positions
            .insert(participant.clone(), staged_position);
        tracing::info!(
            participant = %participant,
            recipient = %recipient,
            amount = %claimed,
            "matured withdrawal claimed"
        );
        self.events.emit(&LedgerEvent::WithdrawalClaimed {
            participant: participant.clone(),
            recipient: recipient.clone(),
            amount: claimed,
        });
        Ok(claimed)
    }

    /// Run an operation phase against the participant's state; restore the
    /// pre-phase snapshot and drop buffered events if it errors.
    pub(crate) fn run_rolled_back(
        &mut self,
        participant: &Address,
        f: impl FnOnce(&mut Self, &mut Vec<LedgerEvent>) -> Result<(), LedgerError>,
    ) -> Result<(), LedgerError> {
        let saved_position = self.positions.get(participant).cloned();
        let saved_queue = self.queues.get(participant).cloned();
        let mut pending = Vec::new();

        match f(self, &mut pending) {
            Ok(()) => {
                for event in &pending {
                    self.events.emit(event);
                }
                Ok(())
            }
            Err(e) => {
                match saved_position {
                    Some(p) => {
                        self.positions.insert(participant.clone(), p);
                    }
                    None => {
                        self.positions.remove(participant);
                    }
                }
                match saved_queue {
                    Some(q) => {
                        self.queues.insert(participant.clone(), q);
                    }
                    None => {
                        self.queues.remove(participant);
                    }
                }
                Err(e)
            }
        }
    }
}
