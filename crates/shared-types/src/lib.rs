//! # Shared Types Crate
//!
//! Primitive types shared by every ledger subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Hash`, `Timestamp` and address types are
//!   defined once here.
//! - **Canonical Encoding**: Anything that is hashed goes through
//!   [`CanonicalEncoder`] or [`canonical_json`], so identical logical content
//!   always produces identical bytes.
//! - **Injectable Time**: Wall-clock reads go through [`TimeSource`] so tests
//!   can drive time explicitly.

pub mod canonical;
pub mod entities;
pub mod errors;
pub mod time;

pub use canonical::{canonical_json, CanonicalEncoder};
pub use entities::*;
pub use errors::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
