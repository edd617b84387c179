//! Fraud detection thresholds.

use serde::{Deserialize, Serialize};

/// Default velocity window (60 seconds).
pub const DEFAULT_VELOCITY_WINDOW_MS: u64 = 60_000;

/// Default number of transactions a sender may issue per window.
pub const DEFAULT_MAX_VELOCITY: usize = 10;

/// Thresholds for the four fraud checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudConfig {
    /// Trailing window for the velocity check.
    pub velocity_window_ms: u64,
    /// A sender exceeding this many transactions per window is fraudulent.
    pub max_velocity: usize,
    /// Amounts divisible by this are flagged as round.
    pub round_amount_modulus: f64,
    /// Amounts strictly above this are flagged for review.
    pub large_amount_threshold: f64,
    /// Per-sender history ring buffer capacity.
    pub history_capacity: usize,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            velocity_window_ms: DEFAULT_VELOCITY_WINDOW_MS,
            max_velocity: DEFAULT_MAX_VELOCITY,
            round_amount_modulus: 1_000.0,
            large_amount_threshold: 100_000.0,
            history_capacity: 256,
        }
    }
}

impl FraudConfig {
    /// Check internal consistency. Returns a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.velocity_window_ms == 0 {
            return Err("velocity_window_ms must be > 0".into());
        }
        if self.round_amount_modulus <= 0.0 {
            return Err("round_amount_modulus must be > 0".into());
        }
        // The ring buffer must be able to hold max_velocity + 1 entries,
        // otherwise the velocity check can never fire.
        if self.history_capacity <= self.max_velocity {
            return Err(format!(
                "history_capacity ({}) must exceed max_velocity ({})",
                self.history_capacity, self.max_velocity
            ));
        }
        Ok(())
    }
}
