//! Flow Models
//!
//! Results of multi-resource flow validations and the structured failure
//! records fed to the self-healing loop.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use deep_validate_checks::{ResourceKind, ValidationResult};

/// Classification of a failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Carrier or handset refused the message
    CarrierRejection,
    /// Callee never answered
    NoAnswer,
    /// Callee was busy
    Busy,
    /// Call could not be connected at all
    Unreachable,
    /// Verification never reached approved
    VerificationIncomplete,
    /// Debugger log holds error-level alerts
    AlertRaised,
    /// Primary resource does not exist
    ResourceMissing,
    /// A count, key or content requirement was not met
    ThresholdViolation,
    /// Anything else
    Unknown,
}

impl FailureCategory {
    /// Short remediation hint for the self-healing loop.
    pub fn hint(&self) -> &'static str {
        match self {
            FailureCategory::CarrierRejection => {
                "Check the destination number, sender registration and message content filtering"
            }
            FailureCategory::NoAnswer => {
                "Ensure the callee endpoint answers or extend the ring timeout"
            }
            FailureCategory::Busy => "Retry later or route to a different endpoint",
            FailureCategory::Unreachable => {
                "Verify the destination number and the call's instruction webhook"
            }
            FailureCategory::VerificationIncomplete => {
                "Confirm the code was submitted before expiry and the channel delivered it"
            }
            FailureCategory::AlertRaised => "Inspect the debugger alerts recorded for the resource",
            FailureCategory::ResourceMissing => {
                "Confirm the identifier and that the creating request succeeded"
            }
            FailureCategory::ThresholdViolation => {
                "Compare the observed counts and keys with the expected configuration"
            }
            FailureCategory::Unknown => "Inspect the validation errors",
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureCategory::CarrierRejection => "carrier_rejection",
            FailureCategory::NoAnswer => "no_answer",
            FailureCategory::Busy => "busy",
            FailureCategory::Unreachable => "unreachable",
            FailureCategory::VerificationIncomplete => "verification_incomplete",
            FailureCategory::AlertRaised => "alert_raised",
            FailureCategory::ResourceMissing => "resource_missing",
            FailureCategory::ThresholdViolation => "threshold_violation",
            FailureCategory::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Diagnosis of one failed validator within a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub flow: String,
    /// Key of the failed result in `FlowResult.results`
    pub validator: String,
    pub resource_type: ResourceKind,
    pub resource_sid: String,
    pub category: FailureCategory,
    pub summary: String,
    pub error_code: Option<i64>,
    pub errors: Vec<String>,
    pub hint: String,
}

/// A captured learning, one line in the session's learnings log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Learning {
    pub id: String,
    pub session_id: String,
    pub recorded_at: DateTime<Utc>,
    pub flow: String,
    pub validator: String,
    pub category: FailureCategory,
    pub resource_sid: String,
    pub summary: String,
    pub hint: String,
    pub error_code: Option<i64>,
}

/// A recurring failure signature, one line per occurrence in the session's
/// patterns log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    /// `category:resource:code`
    pub signature: String,
    pub session_id: String,
    pub category: FailureCategory,
    pub resource_type: ResourceKind,
    pub error_code: Option<i64>,
    /// Occurrences in this session including this one
    pub occurrences: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub example_sid: String,
}

/// Counts over a flow's validators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub total_validators: usize,
    pub passed: usize,
    pub failed: usize,
    /// Duration in milliseconds
    pub duration: u64,
}

/// Verdict for a multi-resource business flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResult {
    pub results: BTreeMap<String, ValidationResult>,
    pub summary: FlowSummary,
    pub all_passed: bool,
    pub diagnoses: Vec<Diagnosis>,
    pub learnings: Vec<Learning>,
    pub patterns: Vec<Pattern>,
}
