//! Snapshot persistence for a ledger instance.
//!
//! Positions, queues, the module registry, and the instance wiring are
//! serialized with bincode; the event bus and the operation flag are
//! transient and start fresh on restore.

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::events::EventBus;
use crate::guard::OperationFlag;
use crate::ledger::StakeLedger;
use crate::position::Position;
use crate::queue::WithdrawalQueue;
use crate::registry::ModuleRegistry;
use serde::{Deserialize, Serialize};
use stakegate_types::Address;
use std::collections::HashMap;

/// Serializable state of one ledger instance.
#[derive(Serialize, Deserialize)]
struct LedgerSnapshot {
    config: LedgerConfig,
    positions: HashMap<Address, Position>,
    queues: HashMap<Address, WithdrawalQueue>,
    registry: ModuleRegistry,
}

impl StakeLedger {
    /// Serialize the ledger state to bytes.
    pub fn save_state(&self) -> Result<Vec<u8>, LedgerError> {
        let snapshot = LedgerSnapshot {
            config: self.config.clone(),
            positions: self.positions.clone(),
            queues: self.queues.clone(),
            registry: self.registry.clone(),
        };
        bincode::serialize(&snapshot).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Restore a ledger from serialized bytes. Event listeners do not
    /// survive a restore and must re-subscribe.
    pub fn load_state(data: &[u8]) -> Result<Self, LedgerError> {
        let snapshot: LedgerSnapshot =
            bincode::deserialize(data).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        Ok(Self {
            config: snapshot.config,
            positions: snapshot.positions,
            queues: snapshot.queues,
            registry: snapshot.registry,
            events: EventBus::new(),
            flag: OperationFlag::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModuleStatus;
    use stakegate_types::{Amount, Timestamp};

    fn ledger() -> StakeLedger {
        let config =
            LedgerConfig::new(Address::new("stk_ledger"), Timestamp::new(1000), 100).unwrap();
        StakeLedger::new(config)
    }

    #[test]
    fn state_survives_a_save_load_cycle() {
        let mut source = ledger();
        let alice = Address::new("stk_alice");
        source
            .positions
            .entry(alice.clone())
            .or_default()
            .credit(Amount::new(500))
            .unwrap();
        source
            .queues
            .entry(alice.clone())
            .or_insert_with(|| WithdrawalQueue::new(3))
            .schedule(3, Amount::new(200))
            .unwrap();
        source.set_module_status(Address::new("stk_module_a"), ModuleStatus::Allowed);
        source.set_migrator(Address::new("stk_old_ledger"));

        let bytes = source.save_state().unwrap();
        let restored = StakeLedger::load_state(&bytes).unwrap();

        assert_eq!(restored.locked_balance(&alice), Amount::new(500));
        assert_eq!(restored.queued_total(&alice), Amount::new(200));
        assert_eq!(
            restored.module_status(&Address::new("stk_module_a")),
            ModuleStatus::Allowed
        );
        assert_eq!(
            restored.migrator(),
            Some(&Address::new("stk_old_ledger"))
        );
        assert_eq!(restored.current_epoch(Timestamp::new(1000)), 1);
        assert!(!restored.flag.is_held());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let result = StakeLedger::load_state(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(result, Err(LedgerError::Snapshot(_))));
    }
}
