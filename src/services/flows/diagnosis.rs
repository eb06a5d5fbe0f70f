//! Failure Diagnosis
//!
//! Classifies a failed `ValidationResult` into a `FailureCategory` with a
//! remediation hint.

use deep_validate_checks::{CheckKind, ResourceKind, ValidationResult};

use crate::models::flow::{Diagnosis, FailureCategory};

/// Vendor error codes that indicate the carrier or handset refused a message.
pub const CARRIER_ERROR_CODES: &[i64] = &[30003, 30004, 30005, 30006, 30007, 30008, 30034];

fn status_failed(result: &ValidationResult) -> bool {
    result
        .check(CheckKind::ResourceStatus)
        .map_or(false, |c| !c.passed)
}

fn primary_missing(result: &ValidationResult) -> bool {
    result
        .check(CheckKind::ResourceStatus)
        .and_then(|c| c.data.as_ref())
        .and_then(|d| d.get("notFound"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn alert_code(result: &ValidationResult) -> Option<i64> {
    result
        .check(CheckKind::DebuggerAlerts)
        .and_then(|c| c.data.as_ref())
        .and_then(|d| d.get("errorCodes"))
        .and_then(|codes| codes.as_array())
        .and_then(|codes| codes.iter().find_map(|c| c.as_i64()))
}

fn categorize(result: &ValidationResult) -> FailureCategory {
    if primary_missing(result) {
        return FailureCategory::ResourceMissing;
    }

    let status = result.primary_status.as_deref().unwrap_or_default();
    if status_failed(result) {
        match result.resource_type {
            ResourceKind::Message => {
                let carrier_code = result
                    .error_code()
                    .map_or(false, |code| CARRIER_ERROR_CODES.contains(&code));
                if carrier_code || status.eq_ignore_ascii_case("undelivered") {
                    return FailureCategory::CarrierRejection;
                }
            }
            ResourceKind::Call => match status.to_ascii_lowercase().as_str() {
                "no-answer" => return FailureCategory::NoAnswer,
                "busy" => return FailureCategory::Busy,
                "failed" => return FailureCategory::Unreachable,
                _ => {}
            },
            ResourceKind::Verification => return FailureCategory::VerificationIncomplete,
            _ => {}
        }
    }

    let failed: Vec<CheckKind> = result.failed_checks().map(|c| c.name).collect();
    if failed.contains(&CheckKind::DebuggerAlerts) {
        return FailureCategory::AlertRaised;
    }
    if failed.iter().any(|kind| {
        matches!(
            kind,
            CheckKind::Participants
                | CheckKind::Reservations
                | CheckKind::TaskAttributes
                | CheckKind::RecordingDuration
                | CheckKind::Sentences
                | CheckKind::Contents
                | CheckKind::Messages
        )
    }) {
        return FailureCategory::ThresholdViolation;
    }
    FailureCategory::Unknown
}

/// Diagnose one validator's result. Passing results have no diagnosis.
pub fn diagnose(flow: &str, validator: &str, result: &ValidationResult) -> Option<Diagnosis> {
    if result.success {
        return None;
    }

    let category = categorize(result);
    let summary = result.errors.first().cloned().unwrap_or_else(|| {
        format!(
            "{} {} failed validation",
            result.resource_type.display_name(),
            result.resource_sid
        )
    });

    Some(Diagnosis {
        flow: flow.to_string(),
        validator: validator.to_string(),
        resource_type: result.resource_type,
        resource_sid: result.resource_sid.clone(),
        category,
        summary,
        error_code: result.error_code().or_else(|| alert_code(result)),
        errors: result.errors.clone(),
        hint: category.hint().to_string(),
    })
}
