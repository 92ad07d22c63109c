//! Ordered vote-instruction batches routed to external modules.

use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::external::ModuleBank;
use crate::position::Position;
use crate::registry::ModuleRegistry;
use serde::{Deserialize, Serialize};
use stakegate_types::{Address, Amount};

/// Whether an instruction assigns or releases voting weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteAction {
    Delegate,
    Revoke,
}

/// One delegate/revoke instruction against a registered module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteInstruction {
    pub module: Address,
    pub amount: Amount,
    pub action: VoteAction,
    /// Opaque payload forwarded to the module unchanged.
    pub extra: Vec<u8>,
}

impl VoteInstruction {
    pub fn delegate(module: Address, amount: Amount) -> Self {
        Self {
            module,
            amount,
            action: VoteAction::Delegate,
            extra: Vec::new(),
        }
    }

    pub fn revoke(module: Address, amount: Amount) -> Self {
        Self {
            module,
            amount,
            action: VoteAction::Revoke,
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, extra: Vec<u8>) -> Self {
        self.extra = extra;
        self
    }
}

/// Apply a batch in array order. Later instructions see the unlocked
/// balance left by earlier ones, so "revoke from A, delegate to B" works
/// in one call. An empty batch is a no-op.
///
/// A revoke credits `unlocked` on the module's word alone; the ledger
/// keeps no per-module delegation totals. The module allow-list is the
/// accepted control for that trust boundary.
pub(crate) fn apply_batch(
    registry: &ModuleRegistry,
    bank: &mut dyn ModuleBank,
    participant: &Address,
    position: &mut Position,
    instructions: &[VoteInstruction],
    events: &mut Vec<LedgerEvent>,
) -> Result<(), LedgerError> {
    for instruction in instructions {
        if instruction.amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let status = registry.status(&instruction.module);
        match instruction.action {
            VoteAction::Delegate => {
                if !status.permits_delegate() {
                    return Err(LedgerError::ModuleNotAllowed(instruction.module.clone()));
                }
                position.reduce_unlocked(instruction.amount)?;
                let module = bank
                    .module(&instruction.module)
                    .ok_or_else(|| LedgerError::ModuleUnavailable(instruction.module.clone()))?;
                module
                    .delegate(participant, instruction.amount, &instruction.extra)
                    .map_err(|reason| LedgerError::ModuleCall {
                        module: instruction.module.clone(),
                        reason,
                    })?;
                tracing::debug!(
                    participant = %participant,
                    module = %instruction.module,
                    amount = %instruction.amount,
                    "delegated voting weight"
                );
                events.push(LedgerEvent::Delegated {
                    participant: participant.clone(),
                    module: instruction.module.clone(),
                    amount: instruction.amount,
                });
            }
            VoteAction::Revoke => {
                if !status.permits_revoke() {
                    return Err(LedgerError::ModuleNotAllowed(instruction.module.clone()));
                }
                let module = bank
                    .module(&instruction.module)
                    .ok_or_else(|| LedgerError::ModuleUnavailable(instruction.module.clone()))?;
                module
                    .revoke(participant, instruction.amount, &instruction.extra)
                    .map_err(|reason| LedgerError::ModuleCall {
                        module: instruction.module.clone(),
                        reason,
                    })?;
                position.increase_unlocked(instruction.amount)?;
                tracing::debug!(
                    participant = %participant,
                    module = %instruction.module,
                    amount = %instruction.amount,
                    "revoked voting weight"
                );
                events.push(LedgerEvent::Revoked {
                    participant: participant.clone(),
                    module: instruction.module.clone(),
                    amount: instruction.amount,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::VotingModule;
    use crate::registry::ModuleStatus;
    use std::collections::HashMap;

    // Local copy of `stakegate_nullables::NullModuleBank`. The nullables
    // crate links the plain rlib build of this crate, so its impl targets a
    // different `ModuleBank` than the one this `cfg(test)` build defines;
    // a unit test must use a double compiled against `crate::`.
    #[derive(Default)]
    struct NullVotingModule {
        delegated: HashMap<Address, u128>,
        fail_next: Option<String>,
    }

    impl NullVotingModule {
        fn delegated(&self, participant: &Address) -> u128 {
            self.delegated.get(participant).copied().unwrap_or(0)
        }

        fn fail_next(&mut self, reason: impl Into<String>) {
            self.fail_next = Some(reason.into());
        }

        fn take_scripted_failure(&mut self) -> Result<(), String> {
            match self.fail_next.take() {
                Some(reason) => Err(reason),
                None => Ok(()),
            }
        }
    }

    impl VotingModule for NullVotingModule {
        fn delegate(
            &mut self,
            participant: &Address,
            amount: Amount,
            _extra: &[u8],
        ) -> Result<(), String> {
            self.take_scripted_failure()?;
            *self.delegated.entry(participant.clone()).or_default() += amount.raw();
            Ok(())
        }

        fn revoke(
            &mut self,
            participant: &Address,
            amount: Amount,
            _extra: &[u8],
        ) -> Result<(), String> {
            self.take_scripted_failure()?;
            let entry = self.delegated.entry(participant.clone()).or_default();
            *entry = entry.saturating_sub(amount.raw());
            Ok(())
        }
    }

    #[derive(Default)]
    struct NullModuleBank {
        modules: HashMap<Address, NullVotingModule>,
    }

    impl NullModuleBank {
        fn new() -> Self {
            Self::default()
        }

        fn add(&mut self, id: Address) {
            self.modules.entry(id).or_default();
        }

        fn get(&self, id: &Address) -> Option<&NullVotingModule> {
            self.modules.get(id)
        }

        fn get_mut(&mut self, id: &Address) -> Option<&mut NullVotingModule> {
            self.modules.get_mut(id)
        }
    }

    impl ModuleBank for NullModuleBank {
        fn module(&mut self, id: &Address) -> Option<&mut dyn VotingModule> {
            self.modules.get_mut(id).map(|m| m as &mut dyn VotingModule)
        }
    }

    fn participant() -> Address {
        Address::new("stk_participant")
    }

    fn module(name: &str) -> Address {
        Address::new(format!("stk_module_{name}"))
    }

    fn amt(n: u128) -> Amount {
        Amount::new(n)
    }

    fn funded_position(unlocked: u128) -> Position {
        let mut p = Position::default();
        p.credit(amt(unlocked)).unwrap();
        p
    }

    fn setup(status: ModuleStatus) -> (ModuleRegistry, NullModuleBank, Address) {
        let m = module("a");
        let mut registry = ModuleRegistry::new();
        registry.set_status(m.clone(), status);
        let mut bank = NullModuleBank::new();
        bank.add(m.clone());
        (registry, bank, m)
    }

    #[test]
    fn delegate_reduces_unlocked_and_reaches_module() {
        let (registry, mut bank, m) = setup(ModuleStatus::Allowed);
        let mut position = funded_position(1000);
        let mut events = Vec::new();

        apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[VoteInstruction::delegate(m.clone(), amt(400))],
            &mut events,
        )
        .unwrap();

        assert_eq!(position.unlocked, amt(600));
        assert_eq!(position.total_locked, amt(1000));
        assert_eq!(bank.get(&m).unwrap().delegated(&participant()), 400);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn delegate_past_unlocked_fails_and_leaves_state() {
        let (registry, mut bank, m) = setup(ModuleStatus::Allowed);
        let mut position = funded_position(1000);
        let mut events = Vec::new();
        position.reduce_unlocked(amt(400)).unwrap();

        let err = apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[VoteInstruction::delegate(m.clone(), amt(700))],
            &mut events,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::InsufficientUnlocked {
                needed: 700,
                available: 600
            }
        ));
        assert_eq!(position.unlocked, amt(600));
        assert!(events.is_empty());
    }

    #[test]
    fn revoke_credits_unlocked() {
        let (registry, mut bank, m) = setup(ModuleStatus::Allowed);
        let mut position = funded_position(1000);
        let mut events = Vec::new();

        apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[
                VoteInstruction::delegate(m.clone(), amt(400)),
                VoteInstruction::revoke(m.clone(), amt(400)),
            ],
            &mut events,
        )
        .unwrap();

        assert_eq!(position.unlocked, amt(1000));
        assert_eq!(bank.get(&m).unwrap().delegated(&participant()), 0);
    }

    #[test]
    fn revoke_then_delegate_frees_balance_within_one_batch() {
        let m_a = module("a");
        let m_b = module("b");
        let mut registry = ModuleRegistry::new();
        registry.set_status(m_a.clone(), ModuleStatus::Allowed);
        registry.set_status(m_b.clone(), ModuleStatus::Allowed);
        let mut bank = NullModuleBank::new();
        bank.add(m_a.clone());
        bank.add(m_b.clone());

        let mut position = funded_position(100);
        let mut events = Vec::new();
        apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[VoteInstruction::delegate(m_a.clone(), amt(100))],
            &mut events,
        )
        .unwrap();
        assert_eq!(position.unlocked, Amount::ZERO);

        // Without the leading revoke, the delegate would fail.
        apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[
                VoteInstruction::revoke(m_a.clone(), amt(100)),
                VoteInstruction::delegate(m_b.clone(), amt(100)),
            ],
            &mut events,
        )
        .unwrap();
        assert_eq!(bank.get(&m_a).unwrap().delegated(&participant()), 0);
        assert_eq!(bank.get(&m_b).unwrap().delegated(&participant()), 100);
    }

    #[test]
    fn revoke_only_module_accepts_revoke_rejects_delegate() {
        let (registry, mut bank, m) = setup(ModuleStatus::RevokeOnly);
        let mut position = funded_position(100);
        let mut events = Vec::new();

        let err = apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[VoteInstruction::delegate(m.clone(), amt(10))],
            &mut events,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ModuleNotAllowed(_)));

        apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[VoteInstruction::revoke(m.clone(), amt(10))],
            &mut events,
        )
        .unwrap();
        assert_eq!(position.unlocked, amt(110));
    }

    #[test]
    fn unregistered_module_rejects_both_actions() {
        let registry = ModuleRegistry::new();
        let mut bank = NullModuleBank::new();
        let m = module("ghost");
        bank.add(m.clone());
        let mut position = funded_position(100);
        let mut events = Vec::new();

        for instruction in [
            VoteInstruction::delegate(m.clone(), amt(10)),
            VoteInstruction::revoke(m.clone(), amt(10)),
        ] {
            let err = apply_batch(
                &registry,
                &mut bank,
                &participant(),
                &mut position,
                &[instruction],
                &mut events,
            )
            .unwrap_err();
            assert!(matches!(err, LedgerError::ModuleNotAllowed(_)));
        }
    }

    #[test]
    fn module_failure_propagates() {
        let (registry, mut bank, m) = setup(ModuleStatus::Allowed);
        bank.get_mut(&m).unwrap().fail_next("module offline");
        let mut position = funded_position(100);
        let mut events = Vec::new();

        let err = apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[VoteInstruction::delegate(m.clone(), amt(10))],
            &mut events,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ModuleCall { .. }));
    }

    #[test]
    fn zero_amount_instruction_is_rejected() {
        let (registry, mut bank, m) = setup(ModuleStatus::Allowed);
        let mut position = funded_position(100);
        let mut events = Vec::new();

        let err = apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[VoteInstruction::delegate(m, Amount::ZERO)],
            &mut events,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ZeroAmount));
    }

    #[test]
    fn empty_batch_is_noop() {
        let (registry, mut bank, _) = setup(ModuleStatus::Allowed);
        let mut position = funded_position(100);
        let mut events = Vec::new();
        apply_batch(
            &registry,
            &mut bank,
            &participant(),
            &mut position,
            &[],
            &mut events,
        )
        .unwrap();
        assert_eq!(position.unlocked, amt(100));
        assert!(events.is_empty());
    }
}
