//! Nullable asset — an in-memory transferable balance.

use stakegate_ledger::{Asset, AssetError, AuthorizationProof};
use stakegate_types::{Address, Amount};
use std::collections::{HashMap, HashSet};

/// In-memory asset with balances, allowances, and one-shot authorization
/// proofs. Proof signatures are not verified — a proof is valid unless its
/// signature bytes were already consumed or rejection is scripted.
#[derive(Default)]
pub struct NullAsset {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    consumed_proofs: HashSet<Vec<u8>>,
    reject_authorizations: bool,
}

impl NullAsset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create balance out of thin air (test setup only).
    pub fn mint(&mut self, to: &Address, amount: Amount) {
        let balance = self.balances.entry(to.clone()).or_default();
        *balance = balance.checked_add(amount).unwrap_or(Amount::MAX);
    }

    pub fn balance(&self, who: &Address) -> Amount {
        self.balances.get(who).copied().unwrap_or(Amount::ZERO)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Total supply across all accounts (conservation checks).
    pub fn total_supply(&self) -> Amount {
        let sum: u128 = self.balances.values().map(|a| a.raw()).sum();
        Amount::try_new(sum).unwrap_or(Amount::MAX)
    }

    /// Script every future authorization proof to be rejected.
    pub fn reject_authorizations(&mut self) {
        self.reject_authorizations = true;
    }

    fn debit(&mut self, from: &Address, amount: Amount) -> Result<(), AssetError> {
        let balance = self.balance(from);
        let remaining = balance
            .checked_sub(amount)
            .ok_or_else(|| AssetError::InsufficientFunds(from.clone()))?;
        self.balances.insert(from.clone(), remaining);
        Ok(())
    }

    fn credit(&mut self, to: &Address, amount: Amount) {
        let balance = self.balances.entry(to.clone()).or_default();
        *balance = balance.checked_add(amount).unwrap_or(Amount::MAX);
    }
}

impl Asset for NullAsset {
    fn pull(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), AssetError> {
        let key = (from.clone(), to.clone());
        let allowance = self.allowance(from, to);
        let remaining = allowance.checked_sub(amount).ok_or_else(|| {
            AssetError::InsufficientAllowance {
                owner: from.clone(),
                spender: to.clone(),
            }
        })?;
        self.debit(from, amount)?;
        self.allowances.insert(key, remaining);
        self.credit(to, amount);
        Ok(())
    }

    fn push(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), AssetError> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
        Ok(())
    }

    fn apply_authorization(&mut self, proof: &AuthorizationProof) -> Result<(), AssetError> {
        if self.reject_authorizations {
            return Err(AssetError::AuthorizationRejected(
                "rejection scripted".into(),
            ));
        }
        if !self.consumed_proofs.insert(proof.signature.clone()) {
            return Err(AssetError::AuthorizationRejected(
                "proof already consumed".into(),
            ));
        }
        self.approve(&proof.owner, &proof.spender, proof.amount)
    }
}
