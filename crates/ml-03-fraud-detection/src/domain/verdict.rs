//! Fraud check results.

use serde::Serialize;
use std::fmt;

/// The individual checks run by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudCheck {
    Blacklist,
    Velocity,
    Pattern,
    Amount,
}

impl fmt::Display for FraudCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Blacklist => "blacklist",
            Self::Velocity => "velocity",
            Self::Pattern => "pattern",
            Self::Amount => "amount",
        };
        f.write_str(name)
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckFinding {
    pub check: FraudCheck,
    pub fraudulent: bool,
    pub reason: Option<String>,
    pub risk_score: f64,
}

impl CheckFinding {
    pub(crate) fn clean(check: FraudCheck) -> Self {
        Self {
            check,
            fraudulent: false,
            reason: None,
            risk_score: 0.0,
        }
    }
}

/// Combined verdict over all checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudVerdict {
    /// True when any check vetoed the transaction.
    pub fraudulent: bool,
    /// Reasons from the vetoing checks only.
    pub reasons: Vec<String>,
    /// Mean of the individual risk scores, in `[0, 1]`.
    pub risk_score: f64,
    /// Every check's outcome, including informational flags.
    pub findings: Vec<CheckFinding>,
}

impl FraudVerdict {
    /// Combine individual findings.
    pub fn from_findings(findings: Vec<CheckFinding>) -> Self {
        let fraudulent = findings.iter().any(|f| f.fraudulent);
        let reasons = findings
            .iter()
            .filter(|f| f.fraudulent)
            .filter_map(|f| f.reason.clone())
            .collect();
        let risk_score = if findings.is_empty() {
            0.0
        } else {
            let total: f64 = findings.iter().map(|f| f.risk_score).sum();
            (total / findings.len() as f64).min(1.0)
        };

        Self {
            fraudulent,
            reasons,
            risk_score,
            findings,
        }
    }

    /// Informational flags raised by non-vetoing checks.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.findings
            .iter()
            .filter(|f| !f.fraudulent)
            .filter_map(|f| f.reason.as_deref())
    }
}
