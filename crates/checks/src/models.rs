//! Validation Models
//!
//! Data structures shared by every check and validator: the resource kinds,
//! their terminal/success status sets, the uniform `Check` record and the
//! per-resource `ValidationResult`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kinds of vendor resources that can be deep-validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Message,
    Call,
    Verification,
    Task,
    Conference,
    Recording,
    Transcript,
    SyncDocument,
    SyncList,
    SyncMap,
    Conversation,
}

impl ResourceKind {
    /// Statuses after which no further transition is expected.
    ///
    /// Shared-state documents have no lifecycle and report an empty set.
    pub fn terminal_statuses(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Message => &["delivered", "undelivered", "failed", "read"],
            ResourceKind::Call => &["completed", "busy", "no-answer", "failed", "canceled"],
            ResourceKind::Verification => {
                &["approved", "expired", "canceled", "max_attempts_reached"]
            }
            ResourceKind::Task => &["completed", "canceled"],
            ResourceKind::Conference => &["completed"],
            ResourceKind::Recording => &["completed", "absent", "failed", "deleted"],
            ResourceKind::Transcript => &["completed", "failed", "canceled", "error"],
            ResourceKind::Conversation => &["closed"],
            ResourceKind::SyncDocument | ResourceKind::SyncList | ResourceKind::SyncMap => &[],
        }
    }

    /// Statuses that count as a successful outcome for the status check.
    pub fn success_statuses(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Message => &["delivered", "read"],
            ResourceKind::Call => &["completed"],
            ResourceKind::Verification => &["approved"],
            ResourceKind::Task => &["pending", "reserved", "assigned", "wrapping", "completed"],
            ResourceKind::Conference => &["init", "in-progress", "completed"],
            ResourceKind::Recording => &["completed"],
            ResourceKind::Transcript => &["completed"],
            ResourceKind::Conversation => &["active", "inactive", "closed"],
            ResourceKind::SyncDocument | ResourceKind::SyncList | ResourceKind::SyncMap => &[],
        }
    }

    /// Whether `status` is terminal for this kind (case-insensitive).
    pub fn is_terminal(&self, status: &str) -> bool {
        self.terminal_statuses()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status))
    }

    /// Whether `status` is in this kind's success set (case-insensitive).
    pub fn is_success(&self, status: &str) -> bool {
        self.success_statuses()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status))
    }

    /// Get human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Message => "Message",
            ResourceKind::Call => "Call",
            ResourceKind::Verification => "Verification",
            ResourceKind::Task => "Task",
            ResourceKind::Conference => "Conference",
            ResourceKind::Recording => "Recording",
            ResourceKind::Transcript => "Transcript",
            ResourceKind::SyncDocument => "Sync document",
            ResourceKind::SyncList => "Sync list",
            ResourceKind::SyncMap => "Sync map",
            ResourceKind::Conversation => "Conversation",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Message => write!(f, "message"),
            ResourceKind::Call => write!(f, "call"),
            ResourceKind::Verification => write!(f, "verification"),
            ResourceKind::Task => write!(f, "task"),
            ResourceKind::Conference => write!(f, "conference"),
            ResourceKind::Recording => write!(f, "recording"),
            ResourceKind::Transcript => write!(f, "transcript"),
            ResourceKind::SyncDocument => write!(f, "sync_document"),
            ResourceKind::SyncList => write!(f, "sync_list"),
            ResourceKind::SyncMap => write!(f, "sync_map"),
            ResourceKind::Conversation => write!(f, "conversation"),
        }
    }
}

/// Name of a check. Declaration order is the order checks appear in a
/// result map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    ResourceStatus,
    DebuggerAlerts,
    CallInsights,
    ConferenceInsights,
    ParticipantInsights,
    Participants,
    Reservations,
    TaskAttributes,
    RecordingDuration,
    Sentences,
    Contents,
    Messages,
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CheckKind::ResourceStatus => "resource_status",
            CheckKind::DebuggerAlerts => "debugger_alerts",
            CheckKind::CallInsights => "call_insights",
            CheckKind::ConferenceInsights => "conference_insights",
            CheckKind::ParticipantInsights => "participant_insights",
            CheckKind::Participants => "participants",
            CheckKind::Reservations => "reservations",
            CheckKind::TaskAttributes => "task_attributes",
            CheckKind::RecordingDuration => "recording_duration",
            CheckKind::Sentences => "sentences",
            CheckKind::Contents => "contents",
            CheckKind::Messages => "messages",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one check against one data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: CheckKind,
    pub passed: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Check {
    /// Create a passed check.
    pub fn passed(name: CheckKind, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            message: message.into(),
            data: None,
        }
    }

    /// Create a failed check.
    pub fn failed(name: CheckKind, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            message: message.into(),
            data: None,
        }
    }

    /// Attach raw data from the source.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A check plus the soft issues noticed while running it.
///
/// Soft issues never fail the check; the aggregator turns them into warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub check: Check,
    pub warnings: Vec<String>,
}

impl CheckOutcome {
    pub fn new(check: Check) -> Self {
        Self {
            check,
            warnings: Vec::new(),
        }
    }

    /// Add a soft issue.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn passed(&self) -> bool {
        self.check.passed
    }
}

impl From<Check> for CheckOutcome {
    fn from(check: Check) -> Self {
        Self::new(check)
    }
}

/// Verdict for a single resource.
///
/// `success` is the conjunction of the checks present in `checks`; a check
/// that did not apply is simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub resource_type: ResourceKind,
    pub resource_sid: String,
    pub primary_status: Option<String>,
    pub success: bool,
    /// Duration in milliseconds
    pub duration: u64,
    pub checks: BTreeMap<CheckKind, Check>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Look up a check by name.
    pub fn check(&self, kind: CheckKind) -> Option<&Check> {
        self.checks.get(&kind)
    }

    /// Checks that ran and failed.
    pub fn failed_checks(&self) -> impl Iterator<Item = &Check> {
        self.checks.values().filter(|c| !c.passed)
    }

    /// Vendor error code recorded by the status check, if any.
    pub fn error_code(&self) -> Option<i64> {
        self.check(CheckKind::ResourceStatus)
            .and_then(|c| c.data.as_ref())
            .and_then(|d| d.get("errorCode"))
            .and_then(Value::as_i64)
    }
}
