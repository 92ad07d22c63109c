//! Allow-list of external voting modules.

use serde::{Deserialize, Serialize};
use stakegate_types::Address;
use std::collections::HashMap;

/// What a registered voting module may be asked to do.
///
/// `RevokeOnly` sunsets a module without stranding participants who
/// already delegated to it: no new weight in, existing weight out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleStatus {
    /// Neither delegating nor revoking is permitted.
    #[default]
    NotAllowed,
    /// Both delegating and revoking are permitted.
    Allowed,
    /// Only revoking is permitted.
    RevokeOnly,
}

impl ModuleStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotAllowed => "not_allowed",
            Self::Allowed => "allowed",
            Self::RevokeOnly => "revoke_only",
        }
    }

    pub fn permits_delegate(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn permits_revoke(&self) -> bool {
        !matches!(self, Self::NotAllowed)
    }
}

/// Registry mapping module identity to its status.
///
/// Unregistered modules are `NotAllowed`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModuleRegistry {
    statuses: HashMap<Address, ModuleStatus>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, module: &Address) -> ModuleStatus {
        self.statuses.get(module).copied().unwrap_or_default()
    }

    /// Set a module's status. Setting `NotAllowed` removes the entry.
    pub fn set_status(&mut self, module: Address, status: ModuleStatus) {
        if status == ModuleStatus::NotAllowed {
            self.statuses.remove(&module);
        } else {
            self.statuses.insert(module, status);
        }
    }

    /// All registered modules and their statuses.
    pub fn entries(&self) -> impl Iterator<Item = (&Address, ModuleStatus)> {
        self.statuses.iter().map(|(a, s)| (a, *s))
    }
}
