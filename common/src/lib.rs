//! Spendtrack Common Types
//!
//! Shared types used across spendtrack crates: currencies, money, raw bank
//! rate quotes, identifiers and time helpers.

pub mod identifiers;
pub mod monetary;
pub mod quote;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use monetary::*;
pub use quote::*;
pub use error::*;
pub use time::*;
