//! State manager configuration.

use serde::{Deserialize, Serialize};

/// Default number of retained state mutations.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Default currency tag for new balances.
pub const DEFAULT_CURRENCY: &str = "LGR";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Capacity of the provenance ring buffer (0 disables history).
    pub history_capacity: usize,
    /// Currency tag stamped on newly created balances.
    pub currency: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}
