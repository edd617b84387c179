//! # ml-03-fraud-detection
//!
//! Risk scoring consulted before a transaction enters the pool.
//!
//! ## Checks
//!
//! | Check | Vetoes | Risk |
//! |-------|--------|------|
//! | Blacklist | yes | 1.0 |
//! | Velocity | yes, above `max_velocity` per window | `min(count / max, 1)` |
//! | Pattern (round amount) | no | 0.3 |
//! | Amount (large) | no | 0.5 |
//!
//! The overall risk score is the mean of the four.
//!
//! ## State
//!
//! Only two registries: the blacklist and a bounded per-sender history used
//! by the velocity check. The velocity check records the transaction even
//! when the final verdict is a rejection.

pub mod domain;

pub use domain::{CheckFinding, FraudCheck, FraudConfig, FraudDetectionSystem, FraudVerdict};
