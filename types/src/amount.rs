//! Token amount type.
//!
//! Amounts are fixed-point integers (u128 raw units) to avoid floating-point
//! errors. The ledger's balance width is 96 bits, so every amount is capped
//! at 2^96 − 1; checked arithmetic treats a result past the cap as overflow.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error raised when constructing an amount past the 96-bit cap.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("amount {0} exceeds the 96-bit balance cap")]
pub struct AmountError(pub u128);

/// A token amount in raw units, capped at 2^96 − 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Largest representable amount (2^96 − 1).
    pub const MAX: Self = Self((1u128 << 96) - 1);

    /// Create an amount from raw units.
    ///
    /// # Panics
    /// Panics if `raw` exceeds the 96-bit cap. Use [`Amount::try_new`] for
    /// untrusted input.
    pub fn new(raw: u128) -> Self {
        assert!(raw <= Self::MAX.0, "amount exceeds 96-bit cap");
        Self(raw)
    }

    /// Create an amount from raw units, rejecting values past the cap.
    pub fn try_new(raw: u128) -> Result<Self, AmountError> {
        if raw > Self::MAX.0 {
            return Err(AmountError(raw));
        }
        Ok(Self(raw))
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition; `None` on overflow past the 96-bit cap.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        let sum = self.0.checked_add(other.0)?;
        if sum > Self::MAX.0 {
            return None;
        }
        Some(Self(sum))
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} raw", self.0)
    }
}
