//! Events emitted by ledger operations for off-ledger observers.

use stakegate_types::{Address, Amount};

/// State-change notifications, each carrying the participant and amount.
///
/// Events fire only after an operation succeeds; a failed operation emits
/// nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Balance was locked for a participant.
    Deposited {
        participant: Address,
        amount: Amount,
    },
    /// An amount entered the withdrawal delay line.
    WithdrawalScheduled {
        participant: Address,
        amount: Amount,
        matures_at_epoch: u64,
    },
    /// Matured amounts were paid out.
    WithdrawalClaimed {
        participant: Address,
        recipient: Address,
        amount: Amount,
    },
    /// Reserved: a scheduled withdrawal was cancelled. No operation in
    /// this core emits it yet.
    WithdrawalCancelled {
        participant: Address,
        amount: Amount,
    },
    /// Voting weight was delegated to a module.
    Delegated {
        participant: Address,
        module: Address,
        amount: Amount,
    },
    /// Voting weight was revoked from a module.
    Revoked {
        participant: Address,
        module: Address,
        amount: Amount,
    },
    /// A module's registry status changed.
    ModuleStatusChanged {
        module: Address,
        status: crate::registry::ModuleStatus,
    },
    /// A position left for the successor ledger.
    MigratedOut {
        participant: Address,
        amount: Amount,
        successor: Address,
    },
    /// A position arrived from the configured migrator.
    DepositedOnBehalf {
        participant: Address,
        amount: Amount,
        migrator: Address,
    },
    /// The successor ledger changed.
    SuccessorChanged { successor: Address },
    /// The migrator identity changed.
    MigratorChanged { migrator: Address },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast
/// to avoid stalling ledger operations.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener for every future event.
    pub fn subscribe(&mut self, listener: impl Fn(&LedgerEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
