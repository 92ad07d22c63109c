//! Identity type with `stk_` prefix.
//!
//! The same address space identifies participants, voting modules, asset
//! accounts, and ledger instances.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stakegate identity, always prefixed with `stk_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all stakegate addresses.
    pub const PREFIX: &'static str = "stk_";

    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `stk_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with stk_");
        Self(s)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_address_roundtrip() {
        let a = Address::new("stk_participant1");
        assert_eq!(a.as_str(), "stk_participant1");
        assert!(a.is_valid());
    }

    #[test]
    #[should_panic(expected = "must start with stk_")]
    fn wrong_prefix_panics() {
        Address::new("brst_whoops");
    }

    #[test]
    fn bare_prefix_is_not_valid() {
        let a = Address::new("stk_");
        assert!(!a.is_valid());
    }
}
