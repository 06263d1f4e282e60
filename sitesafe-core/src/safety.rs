//! Rule-based safety verdict over a [`CountTable`]

use crate::counts::CountTable;
use serde::{Deserialize, Serialize};

pub const PERSON_LABEL: &str = "person";
pub const NO_HELMET_LABEL: &str = "no-helmet";
pub const NO_VEST_LABEL: &str = "no-vest";

/// The three sub-counts a verdict is justified by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafetyCounts {
    pub person: usize,
    pub no_helmet: usize,
    pub no_vest: usize,
}

impl SafetyCounts {
    /// Tolerant lookup: labels missing from the table count as zero
    pub fn from_table(counts: &CountTable) -> Self {
        Self {
            person: counts.count_or_zero(PERSON_LABEL),
            no_helmet: counts.count_or_zero(NO_HELMET_LABEL),
            no_vest: counts.count_or_zero(NO_VEST_LABEL),
        }
    }
}

/// How a verdict should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SafetyVerdict {
    NoWorkersDetected,
    ViolationDetected(SafetyCounts),
    AllSafe(SafetyCounts),
}

impl SafetyVerdict {
    /// Sub-counts, absent for [`SafetyVerdict::NoWorkersDetected`]
    pub fn counts(&self) -> Option<SafetyCounts> {
        match self {
            SafetyVerdict::NoWorkersDetected => None,
            SafetyVerdict::ViolationDetected(c) | SafetyVerdict::AllSafe(c) => Some(*c),
        }
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, SafetyVerdict::ViolationDetected(_))
    }

    pub fn severity(&self) -> Severity {
        match self {
            SafetyVerdict::NoWorkersDetected => Severity::Warning,
            SafetyVerdict::ViolationDetected(_) => Severity::Error,
            SafetyVerdict::AllSafe(_) => Severity::Success,
        }
    }

    /// Banner text
    pub fn message(&self) -> &'static str {
        match self {
            SafetyVerdict::NoWorkersDetected => "No workers detected.",
            SafetyVerdict::ViolationDetected(_) => {
                "Some workers are not wearing their safety equipment!"
            }
            SafetyVerdict::AllSafe(_) => "All detected workers are safe.",
        }
    }
}

/// Derive the verdict for one image.
///
/// `person == 0` wins over everything else; otherwise any `no-helmet` or
/// `no-vest` detection is a violation.
pub fn evaluate(counts: &CountTable) -> SafetyVerdict {
    let sub = SafetyCounts::from_table(counts);

    if sub.person == 0 {
        SafetyVerdict::NoWorkersDetected
    } else if sub.no_helmet > 0 || sub.no_vest > 0 {
        SafetyVerdict::ViolationDetected(sub)
    } else {
        SafetyVerdict::AllSafe(sub)
    }
}
