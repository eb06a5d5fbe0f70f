//! Check Functions
//!
//! One function per data source, each producing a uniform `CheckOutcome`:
//!
//! - `resource_status` / `resource_fetch_failed` - the primary status endpoint
//! - `debugger_alerts` - error/warning log entries scoped to the resource
//! - `insights_summary` / `participant_insights` - analytics summaries, tolerant
//!   of the propagation window after a resource completes
//! - `structural` - required/optional keys in a sub-resource payload
//! - `minimum_count` - listings that must contain at least N entries
//!
//! Check functions never throw for domain outcomes. Only unexpected client
//! errors (transport, parse) come back as `Err`.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::{json, Value};

use deep_validate_core::{
    AlertLevel, AlertQuery, CallSummaryRecord, ClientError, ClientResult,
    ConferenceSummaryRecord, ParticipantSummaryRecord, ProcessingState, VendorClient,
};

use crate::models::{Check, CheckKind, CheckOutcome, ResourceKind};

/// Partial analytics data typically appears this long after completion.
pub const INSIGHTS_PARTIAL_WINDOW_MINUTES: i64 = 2;
/// Analytics data is finalized and locked this long after completion.
pub const INSIGHTS_FINAL_WINDOW_MINUTES: i64 = 30;

// ============================================================================
// Status
// ============================================================================

/// Status check: passes only if `status` is in the success set.
///
/// `expected` overrides the kind's default success set when non-empty.
pub fn resource_status(
    kind: ResourceKind,
    sid: &str,
    status: &str,
    error_code: Option<i64>,
    expected: &[String],
) -> CheckOutcome {
    let data = json!({ "status": status, "errorCode": error_code });
    let ok = if expected.is_empty() {
        kind.is_success(status)
    } else {
        expected.iter().any(|s| s.eq_ignore_ascii_case(status))
    };

    let check = if ok {
        Check::passed(
            CheckKind::ResourceStatus,
            format!("{} {} is {}", kind.display_name(), sid, status),
        )
    } else {
        let mut message = format!(
            "{} {} has status '{}'",
            kind.display_name(),
            sid,
            status
        );
        if !kind.is_terminal(status) && !kind.terminal_statuses().is_empty() {
            message.push_str(" and did not reach a terminal state");
        }
        if let Some(code) = error_code {
            message.push_str(&format!(" (error {})", code));
        }
        Check::failed(CheckKind::ResourceStatus, message)
    };

    CheckOutcome::new(check.with_data(data))
}

/// Status check for a resource whose primary fetch failed with a domain error.
pub fn resource_fetch_failed(kind: ResourceKind, sid: &str, err: &ClientError) -> CheckOutcome {
    let message = if err.is_not_found() {
        format!("{} {} not found", kind.display_name(), sid)
    } else {
        format!("Failed to fetch {} {}: {}", kind, sid, err)
    };
    CheckOutcome::new(
        Check::failed(CheckKind::ResourceStatus, message).with_data(json!({
            "status": Value::Null,
            "errorCode": err.vendor_code(),
            "notFound": err.is_not_found(),
        })),
    )
}

// ============================================================================
// Debugger alerts
// ============================================================================

/// Debugger check: passes iff there are zero error-level alerts for the
/// resource within `lookback` of `now`. Warning-level alerts become warnings.
pub async fn debugger_alerts<C>(
    client: &C,
    resource_sid: &str,
    lookback: ChronoDuration,
    now: DateTime<Utc>,
) -> ClientResult<CheckOutcome>
where
    C: VendorClient + ?Sized,
{
    let query = AlertQuery {
        resource_sid: resource_sid.to_string(),
        start: now
            .checked_sub_signed(lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC),
        end: now,
    };

    let alerts = match client.list_alerts(&query).await {
        Ok(alerts) => alerts,
        Err(e) if e.is_unexpected() => return Err(e),
        Err(e) => {
            return Ok(CheckOutcome::new(Check::failed(
                CheckKind::DebuggerAlerts,
                format!("Could not query debugger log for {}: {}", resource_sid, e),
            )));
        }
    };

    let scoped: Vec<_> = alerts
        .into_iter()
        .filter(|a| a.resource_sid.as_deref() == Some(resource_sid))
        .collect();

    let errors: Vec<_> = scoped
        .iter()
        .filter(|a| a.log_level == AlertLevel::Error)
        .collect();
    let warnings: Vec<_> = scoped
        .iter()
        .filter(|a| a.log_level == AlertLevel::Warning)
        .collect();

    let error_codes: Vec<i64> = errors.iter().filter_map(|a| a.error_code).collect();
    let data = json!({
        "errorCount": errors.len(),
        "warningCount": warnings.len(),
        "errorCodes": error_codes,
    });

    let check = if errors.is_empty() {
        Check::passed(
            CheckKind::DebuggerAlerts,
            format!("No error alerts for {}", resource_sid),
        )
    } else {
        Check::failed(
            CheckKind::DebuggerAlerts,
            format!(
                "{} error alert(s) for {}: {}",
                errors.len(),
                resource_sid,
                errors
                    .iter()
                    .map(|a| match a.error_code {
                        Some(code) => format!("{} {}", code, a.alert_text),
                        None => a.alert_text.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        )
    };

    let mut outcome = CheckOutcome::new(check.with_data(data));
    for alert in warnings {
        let code = alert
            .error_code
            .map(|c| format!(" {}", c))
            .unwrap_or_default();
        outcome = outcome.with_warning(format!(
            "Debugger warning{} for {}: {}",
            code, resource_sid, alert.alert_text
        ));
    }
    Ok(outcome)
}

// ============================================================================
// Insights
// ============================================================================

/// Analytics records that carry a processing state.
pub trait InsightsRecord {
    fn processing_state(&self) -> ProcessingState;
    fn summary_data(&self) -> Value;
}

impl InsightsRecord for CallSummaryRecord {
    fn processing_state(&self) -> ProcessingState {
        self.processing_state
    }

    fn summary_data(&self) -> Value {
        json!({
            "callState": self.call_state,
            "processingState": self.processing_state,
            "durationSecs": self.duration_secs,
        })
    }
}

impl InsightsRecord for ConferenceSummaryRecord {
    fn processing_state(&self) -> ProcessingState {
        self.processing_state
    }

    fn summary_data(&self) -> Value {
        json!({
            "status": self.status,
            "processingState": self.processing_state,
            "maxConcurrentParticipants": self.max_concurrent_participants,
        })
    }
}

/// Message for a 404 inside the propagation window, or `None` once the
/// window has closed.
fn not_yet_available(
    subject: &str,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<String> {
    let since = completed_at.map(|t| now - t);
    match since {
        Some(elapsed) if elapsed > ChronoDuration::minutes(INSIGHTS_FINAL_WINDOW_MINUTES) => None,
        Some(elapsed) if elapsed < ChronoDuration::minutes(INSIGHTS_PARTIAL_WINDOW_MINUTES) => {
            Some(format!(
                "Insights data not yet available for {} \
                 (timing: partial data appears ~{} minutes after completion)",
                subject, INSIGHTS_PARTIAL_WINDOW_MINUTES
            ))
        }
        _ => Some(format!(
            "Insights data not yet available for {} \
             (timing: final data locks ~{} minutes after completion)",
            subject, INSIGHTS_FINAL_WINDOW_MINUTES
        )),
    }
}

/// Analytics summary check.
///
/// A 404 within the propagation window passes with a timing message. A 404
/// more than the final window after `completed_at` fails. Other API errors
/// fail; unexpected errors propagate.
pub fn insights_summary<T: InsightsRecord>(
    kind: CheckKind,
    subject: &str,
    result: ClientResult<T>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ClientResult<CheckOutcome> {
    match result {
        Ok(record) => {
            let data = record.summary_data();
            match record.processing_state() {
                ProcessingState::Complete => Ok(CheckOutcome::new(
                    Check::passed(kind, format!("Insights summary complete for {}", subject))
                        .with_data(data),
                )),
                ProcessingState::Partial => Ok(CheckOutcome::new(
                    Check::passed(kind, format!("Insights summary partial for {}", subject))
                        .with_data(data),
                )
                .with_warning(format!(
                    "Insights data for {} is partial; \
                     final data locks ~{} minutes after completion",
                    subject, INSIGHTS_FINAL_WINDOW_MINUTES
                ))),
            }
        }
        Err(e) if e.is_unexpected() => Err(e),
        Err(e) if e.is_not_found() => Ok(timing_outcome(kind, subject, completed_at, now)),
        Err(e) => Ok(CheckOutcome::new(Check::failed(
            kind,
            format!("Failed to fetch insights for {}: {}", subject, e),
        ))),
    }
}

/// Participant analytics check. An empty listing is treated like a 404.
pub fn participant_insights(
    subject: &str,
    result: ClientResult<Vec<ParticipantSummaryRecord>>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ClientResult<CheckOutcome> {
    let kind = CheckKind::ParticipantInsights;
    match result {
        Ok(summaries) if summaries.is_empty() => {
            Ok(timing_outcome(kind, subject, completed_at, now))
        }
        Ok(summaries) => {
            let partial = summaries
                .iter()
                .filter(|s| s.processing_state == ProcessingState::Partial)
                .count();
            let data = json!({
                "participantCount": summaries.len(),
                "partialCount": partial,
            });
            let mut outcome = CheckOutcome::new(
                Check::passed(
                    kind,
                    format!(
                        "{} participant summaries for {}",
                        summaries.len(),
                        subject
                    ),
                )
                .with_data(data),
            );
            if partial > 0 {
                outcome = outcome.with_warning(format!(
                    "{} participant summaries for {} are partial",
                    partial, subject
                ));
            }
            Ok(outcome)
        }
        Err(e) if e.is_unexpected() => Err(e),
        Err(e) if e.is_not_found() => Ok(timing_outcome(kind, subject, completed_at, now)),
        Err(e) => Ok(CheckOutcome::new(Check::failed(
            kind,
            format!("Failed to fetch participant insights for {}: {}", subject, e),
        ))),
    }
}

fn timing_outcome(
    kind: CheckKind,
    subject: &str,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> CheckOutcome {
    match not_yet_available(subject, completed_at, now) {
        Some(message) => {
            tracing::debug!(subject, "{}", message);
            CheckOutcome::new(
                Check::passed(kind, message).with_data(json!({ "available": false })),
            )
        }
        None => CheckOutcome::new(
            Check::failed(
                kind,
                format!(
                    "Insights data missing for {} more than {} minutes after completion",
                    subject, INSIGHTS_FINAL_WINDOW_MINUTES
                ),
            )
            .with_data(json!({ "available": false })),
        ),
    }
}

// ============================================================================
// Structural checks
// ============================================================================

/// JSON value types a key can be required to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Bool,
    Object,
    Array,
    Null,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => JsonType::String,
            Value::Number(_) => JsonType::Number,
            Value::Bool(_) => JsonType::Bool,
            Value::Object(_) => JsonType::Object,
            Value::Array(_) => JsonType::Array,
            Value::Null => JsonType::Null,
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Bool => "bool",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
        };
        write!(f, "{}", name)
    }
}

/// An expected key in a sub-resource payload. Dotted keys address nested objects.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySpec {
    pub key: String,
    #[serde(default)]
    pub expected_type: Option<JsonType>,
    #[serde(default)]
    pub required: bool,
}

impl KeySpec {
    pub fn required(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expected_type: None,
            required: true,
        }
    }

    pub fn optional(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expected_type: None,
            required: false,
        }
    }

    pub fn with_type(mut self, expected_type: JsonType) -> Self {
        self.expected_type = Some(expected_type);
        self
    }

    /// Resolve a dotted key segment by segment; '/' and '~' are literal.
    fn lookup<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        self.key
            .split('.')
            .try_fold(data, |value, segment| match value {
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => value.get(segment),
            })
    }
}

/// Compare a payload against expected keys.
///
/// Missing or mistyped required keys fail the check; the same problems on
/// optional keys are warnings.
pub fn structural(
    kind: CheckKind,
    subject: &str,
    data: &Value,
    expected: &[KeySpec],
) -> CheckOutcome {
    let mut found = Vec::new();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();
    let mut hard = Vec::new();
    let mut soft = Vec::new();

    for key_spec in expected {
        match key_spec.lookup(data) {
            None => {
                missing.push(key_spec.key.clone());
                let msg = format!("Missing key '{}' in {}", key_spec.key, subject);
                if key_spec.required {
                    hard.push(msg);
                } else {
                    soft.push(msg);
                }
            }
            Some(value) => {
                found.push(key_spec.key.clone());
                if let Some(expected_type) = key_spec.expected_type {
                    let actual = JsonType::of(value);
                    if actual != expected_type {
                        mismatched.push(key_spec.key.clone());
                        let msg = format!(
                            "Key '{}' in {} is {}, expected {}",
                            key_spec.key, subject, actual, expected_type
                        );
                        if key_spec.required {
                            hard.push(msg);
                        } else {
                            soft.push(msg);
                        }
                    }
                }
            }
        }
    }

    let check_data = json!({
        "found": found,
        "missing": missing,
        "typeMismatches": mismatched,
    });

    let check = if hard.is_empty() {
        Check::passed(
            kind,
            format!("{} of {} expected keys present in {}", found.len(), expected.len(), subject),
        )
    } else {
        Check::failed(kind, hard.join("; "))
    };

    let mut outcome = CheckOutcome::new(check.with_data(check_data));
    outcome.warnings = soft;
    outcome
}

/// Listing check: passes when `count >= minimum`.
pub fn minimum_count(
    kind: CheckKind,
    subject: &str,
    noun: &str,
    count: usize,
    minimum: usize,
) -> CheckOutcome {
    let data = json!({ "count": count, "minimum": minimum });
    let check = if count >= minimum {
        Check::passed(kind, format!("{} has {} {}", subject, count, noun))
    } else {
        Check::failed(
            kind,
            format!(
                "{} has only {} {}, expected at least {}",
                subject, count, noun, minimum
            ),
        )
    };
    CheckOutcome::new(check.with_data(data))
}
