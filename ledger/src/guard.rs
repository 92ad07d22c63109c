//! Single-flag reentrancy protection for public mutating operations.
//!
//! Control can pass to untrusted modules or a successor ledger mid-call.
//! Every mutating entry point acquires the flag at entry; the RAII guard
//! releases it on every exit path, error paths included. A call arriving
//! while the flag is held fails with `OperationInProgress`.

use crate::error::LedgerError;
use std::cell::Cell;
use std::rc::Rc;

/// The "operation in progress" flag, shared with live guards.
#[derive(Clone, Debug)]
pub struct OperationFlag(Rc<Cell<bool>>);

impl OperationFlag {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(false)))
    }

    /// Acquire the flag, or fail if an operation is already running.
    pub fn enter(&self) -> Result<OperationGuard, LedgerError> {
        if self.0.get() {
            return Err(LedgerError::OperationInProgress);
        }
        self.0.set(true);
        Ok(OperationGuard(Rc::clone(&self.0)))
    }

    /// Whether an operation currently holds the flag.
    pub fn is_held(&self) -> bool {
        self.0.get()
    }
}

impl Default for OperationFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the flag when dropped.
pub struct OperationGuard(Rc<Cell<bool>>);

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_enter_fails_while_held() {
        let flag = OperationFlag::new();
        let guard = flag.enter().unwrap();
        assert!(flag.is_held());
        assert!(matches!(
            flag.enter(),
            Err(LedgerError::OperationInProgress)
        ));
        drop(guard);
        assert!(!flag.is_held());
        assert!(flag.enter().is_ok());
    }

    #[test]
    fn guard_releases_on_early_exit() {
        let flag = OperationFlag::new();
        let attempt = || -> Result<(), LedgerError> {
            let _guard = flag.enter()?;
            Err(LedgerError::ZeroAmount)
        };
        assert!(attempt().is_err());
        assert!(!flag.is_held());
    }
}
