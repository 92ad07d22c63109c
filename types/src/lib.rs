//! Fundamental types shared by all stakegate crates.
//!
//! - [`Amount`] — raw token units, capped at 2^96 − 1
//! - [`Address`] — prefixed identity string for participants, modules,
//!   asset accounts, and ledger instances
//! - [`Timestamp`] — Unix seconds

pub mod address;
pub mod amount;
pub mod time;

pub use address::Address;
pub use amount::{Amount, AmountError};
pub use time::Timestamp;
