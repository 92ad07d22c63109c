//! Nullable voting modules — record delegations, fail on demand.

use stakegate_ledger::{ModuleBank, VotingModule};
use stakegate_types::{Address, Amount};
use std::collections::HashMap;

/// A recorded call into a nullable module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleCall {
    pub participant: Address,
    pub amount: Amount,
    pub is_delegate: bool,
    pub extra: Vec<u8>,
}

/// A voting module double that tracks net delegated weight per
/// participant and records every call it receives.
#[derive(Default)]
pub struct NullVotingModule {
    delegated: HashMap<Address, u128>,
    calls: Vec<ModuleCall>,
    fail_next: Option<String>,
}

impl NullVotingModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net weight currently delegated by `participant`.
    pub fn delegated(&self, participant: &Address) -> u128 {
        self.delegated.get(participant).copied().unwrap_or(0)
    }

    pub fn calls(&self) -> &[ModuleCall] {
        &self.calls
    }

    /// Script the next call to fail with `reason`.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
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
        extra: &[u8],
    ) -> Result<(), String> {
        self.take_scripted_failure()?;
        *self.delegated.entry(participant.clone()).or_default() += amount.raw();
        self.calls.push(ModuleCall {
            participant: participant.clone(),
            amount,
            is_delegate: true,
            extra: extra.to_vec(),
        });
        Ok(())
    }

    fn revoke(
        &mut self,
        participant: &Address,
        amount: Amount,
        extra: &[u8],
    ) -> Result<(), String> {
        self.take_scripted_failure()?;
        let entry = self.delegated.entry(participant.clone()).or_default();
        // A real module would reject an over-revoke; the null module lets
        // it through so tests can exercise the ledger's trust boundary.
        *entry = entry.saturating_sub(amount.raw());
        self.calls.push(ModuleCall {
            participant: participant.clone(),
            amount,
            is_delegate: false,
            extra: extra.to_vec(),
        });
        Ok(())
    }
}

/// A bank of nullable modules keyed by identity.
#[derive(Default)]
pub struct NullModuleBank {
    modules: HashMap<Address, NullVotingModule>,
}

impl NullModuleBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty module under `id`.
    pub fn add(&mut self, id: Address) {
        self.modules.entry(id).or_default();
    }

    pub fn get(&self, id: &Address) -> Option<&NullVotingModule> {
        self.modules.get(id)
    }

    pub fn get_mut(&mut self, id: &Address) -> Option<&mut NullVotingModule> {
        self.modules.get_mut(id)
    }
}

impl ModuleBank for NullModuleBank {
    fn module(&mut self, id: &Address) -> Option<&mut dyn VotingModule> {
        self.modules.get_mut(id).map(|m| m as &mut dyn VotingModule)
    }
}
