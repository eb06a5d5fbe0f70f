//! Per-Resource Validator Integration Tests
//!
//! Drives each `validate_*` entry point through the scripted client and
//! checks the resulting check map, errors and warnings.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;

use deep_validate::{
    AppError, CheckKind, ClientError, ConferenceOptions, ConversationOptions, JsonType, KeySpec,
    ResourceKind, TaskOptions, TranscriptOptions, ValidateOptions, ValidatorConfig,
};
use deep_validate_core::{AlertLevel, ProcessingState};

use super::fake_client::*;
use super::{fast_config, validator_with};

// ============================================================================
// Message
// ============================================================================

#[tokio::test]
async fn test_delivered_message_passes() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.ok("SM1", message("SM1", "delivered", None));
    });

    let result = validator
        .validate_message("SM1", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.resource_type, ResourceKind::Message);
    assert_eq!(result.primary_status.as_deref(), Some("delivered"));
    assert!(result.check(CheckKind::ResourceStatus).unwrap().passed);
    assert!(result.check(CheckKind::DebuggerAlerts).unwrap().passed);
    assert!(result.errors.is_empty());

    let queries = client.alert_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].resource_sid, "SM1");
    assert_eq!(queries[0].end - queries[0].start, chrono::Duration::seconds(300));
}

#[tokio::test]
async fn test_message_polled_until_terminal() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages
            .ok("SM2", message("SM2", "queued", None))
            .ok("SM2", message("SM2", "sent", None))
            .ok("SM2", message("SM2", "delivered", None));
    });

    let result = validator
        .validate_message("SM2", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.primary_status.as_deref(), Some("delivered"));
    assert_eq!(client.fetch_count("SM2"), 3);
}

#[tokio::test]
async fn test_undelivered_message_reports_error_code() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.ok("SM3", message("SM3", "undelivered", Some(30007)));
    });

    let result = validator
        .validate_message("SM3", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.error_code(), Some(30007));
    let status = result.check(CheckKind::ResourceStatus).unwrap();
    assert!(!status.passed);
    assert!(status.message.contains("30007"));
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("resource_status:"));
}

#[tokio::test]
async fn test_missing_message_is_a_failed_check_not_an_error() {
    let temp = TempDir::new().unwrap();
    let (_client, validator) = validator_with(fast_config(temp.path()));

    let result = validator
        .validate_message("SM404", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.primary_status.is_none());
    let status = result.check(CheckKind::ResourceStatus).unwrap();
    assert!(status.message.contains("not found"));
    assert_eq!(status.data.as_ref().unwrap()["notFound"], true);
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.err("SM5", ClientError::transport("connection reset"));
    });

    let err = validator
        .validate_message("SM5", &ValidateOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Client(ClientError::Transport { .. })));
}

#[tokio::test]
async fn test_stuck_message_times_out_with_last_status() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.ok("SM6", message("SM6", "sent", None));
    });

    let started = std::time::Instant::now();
    let result = validator
        .validate_message("SM6", &ValidateOptions::without_alerts())
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!result.success);
    assert_eq!(result.primary_status.as_deref(), Some("sent"));
    let status = result.check(CheckKind::ResourceStatus).unwrap();
    assert!(status.message.contains("did not reach a terminal state"));
    assert!(result.check(CheckKind::DebuggerAlerts).is_none());
    assert!(client.fetch_count("SM6") > 1);
}

#[tokio::test]
async fn test_expected_status_override() {
    let temp = TempDir::new().unwrap();
    let config = ValidatorConfig::builder()
        .wait_for_terminal(false)
        .log_dir(temp.path())
        .build()
        .unwrap();
    let (client, validator) = validator_with(config);
    client.script(|s| {
        s.messages.ok("SM7", message("SM7", "sent", None));
    });

    let result = validator
        .validate_message("SM7", &ValidateOptions::default().expecting(&["sent"]))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(client.fetch_count("SM7"), 1);
}

// ============================================================================
// Debugger alerts
// ============================================================================

#[tokio::test]
async fn test_error_alert_fails_and_warning_alert_warns() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages
            .ok("SM8", message("SM8", "delivered", None))
            .ok("SM9", message("SM9", "delivered", None));
        s.alerts = vec![
            alert("SM8", AlertLevel::Error, 11200, "HTTP retrieval failure"),
            alert("SM9", AlertLevel::Warning, 12300, "Invalid content type"),
        ];
    });

    let failing = validator
        .validate_message("SM8", &ValidateOptions::default())
        .await
        .unwrap();
    assert!(!failing.success);
    let alerts = failing.check(CheckKind::DebuggerAlerts).unwrap();
    assert!(alerts.message.contains("11200"));
    assert_eq!(alerts.data.as_ref().unwrap()["errorCodes"], json!([11200]));

    let warned = validator
        .validate_message("SM9", &ValidateOptions::default())
        .await
        .unwrap();
    assert!(warned.success);
    assert_eq!(warned.warnings.len(), 1);
    assert!(warned.warnings[0].contains("12300"));
}

#[tokio::test]
async fn test_alert_query_failure_is_a_failed_check() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.ok("SM10", message("SM10", "delivered", None));
        s.alert_error = Some(ClientError::api(403, Some(20003), "Permission denied"));
    });

    let result = validator
        .validate_message("SM10", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(!result.check(CheckKind::DebuggerAlerts).unwrap().passed);
    assert!(result.check(CheckKind::ResourceStatus).unwrap().passed);
}

#[tokio::test]
async fn test_unscoped_alert_does_not_fail_resource() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.ok("SM11", message("SM11", "delivered", None));
        let mut account_wide = alert("SM11", AlertLevel::Error, 20003, "Authentication failure");
        account_wide.resource_sid = None;
        s.alerts = vec![account_wide];
    });

    let result = validator
        .validate_message("SM11", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.check(CheckKind::DebuggerAlerts).unwrap().passed);
}

// ============================================================================
// Call
// ============================================================================

#[tokio::test]
async fn test_recent_call_without_insights_passes_with_timing_message() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.calls.ok("CA1", call("CA1", "completed", Some(Utc::now())));
    });

    let result = validator
        .validate_call("CA1", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    let insights = result.check(CheckKind::CallInsights).unwrap();
    assert!(insights.passed);
    assert!(insights.message.contains("not yet available"));
    assert!(insights.message.contains("timing"));
}

#[tokio::test]
async fn test_call_insights_missing_long_after_completion_fails() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    let ended = Utc::now() - chrono::Duration::minutes(45);
    client.script(|s| {
        s.calls.ok("CA2", call("CA2", "completed", Some(ended)));
    });

    let result = validator
        .validate_call("CA2", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(!result.check(CheckKind::CallInsights).unwrap().passed);
}

#[tokio::test]
async fn test_partial_call_insights_warns() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.calls.ok("CA3", call("CA3", "completed", Some(Utc::now())));
        s.call_summaries
            .ok("CA3", call_summary("CA3", ProcessingState::Partial));
    });

    let result = validator
        .validate_call("CA3", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.check(CheckKind::CallInsights).unwrap().passed);
    assert!(result.warnings.iter().any(|w| w.contains("partial")));
}

#[tokio::test]
async fn test_in_progress_call_has_no_insights_check() {
    let temp = TempDir::new().unwrap();
    let config = ValidatorConfig::builder()
        .wait_for_terminal(false)
        .log_dir(temp.path())
        .build()
        .unwrap();
    let (client, validator) = validator_with(config);
    client.script(|s| {
        s.calls.ok("CA4", call("CA4", "in-progress", None));
    });

    let result = validator
        .validate_call("CA4", &ValidateOptions::default().expecting(&["in-progress"]))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.check(CheckKind::CallInsights).is_none());
    assert_eq!(result.checks.len(), 2);
}

#[tokio::test]
async fn test_unanswered_call_fails() {
    let temp = TempDir::new().unwrap();
    let config = ValidatorConfig::builder()
        .poll_timeout(Duration::from_secs(1))
        .poll_interval(Duration::from_millis(10))
        .check_insights(false)
        .log_dir(temp.path())
        .build()
        .unwrap();
    let (client, validator) = validator_with(config);
    client.script(|s| {
        s.calls.ok("CA5", call("CA5", "no-answer", Some(Utc::now())));
    });

    let result = validator
        .validate_call("CA5", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.check(CheckKind::CallInsights).is_none());
    assert!(result.errors[0].contains("no-answer"));
}

// ============================================================================
// Verification and task
// ============================================================================

#[tokio::test]
async fn test_verification_requires_approved() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.verifications
            .ok("VE1", verification("VE1", "approved"))
            .ok("VE2", verification("VE2", "expired"));
    });

    let approved = validator
        .validate_verification("VA1", "VE1", &ValidateOptions::default())
        .await
        .unwrap();
    assert!(approved.success);
    let data = approved.check(CheckKind::ResourceStatus).unwrap().data.clone().unwrap();
    assert_eq!(data["channel"], "sms");

    let expired = validator
        .validate_verification("VA1", "VE2", &ValidateOptions::default())
        .await
        .unwrap();
    assert!(!expired.success);
}

#[tokio::test]
async fn test_task_attributes_and_reservations() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.tasks.ok(
            "WT1",
            task("WT1", "pending", json!({ "language": "en", "customer": { "tier": "gold" } })),
        );
    });

    let options = TaskOptions {
        expected_attributes: vec![
            KeySpec::required("language").with_type(JsonType::String),
            KeySpec::required("customer.tier"),
            KeySpec::optional("priority"),
        ],
        ..TaskOptions::default()
    };
    let result = validator.validate_task("WS1", "WT1", &options).await.unwrap();

    assert!(result.success);
    assert!(result.check(CheckKind::TaskAttributes).unwrap().passed);
    assert!(result.check(CheckKind::Reservations).unwrap().passed);
    assert!(result.warnings.iter().any(|w| w.contains("no reservations")));
    assert!(result.warnings.iter().any(|w| w.contains("priority")));
}

#[tokio::test]
async fn test_task_missing_required_attribute_fails() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.tasks.ok("WT2", task("WT2", "assigned", json!({ "language": "en" })));
        s.reservations.ok("WT2", vec![reservation("WR1", "accepted")]);
    });

    let options = TaskOptions {
        expected_attributes: vec![KeySpec::required("skill")],
        require_reservation: true,
        ..TaskOptions::default()
    };
    let result = validator.validate_task("WS1", "WT2", &options).await.unwrap();

    assert!(!result.success);
    assert!(!result.check(CheckKind::TaskAttributes).unwrap().passed);
    assert!(result.check(CheckKind::Reservations).unwrap().passed);
    assert_eq!(result.errors.len(), 1);
}

// ============================================================================
// Conference
// ============================================================================

#[tokio::test]
async fn test_live_conference_checks_participants() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.conferences.ok("CF1", conference("CF1", "in-progress"));
        s.participants.ok("CF1", vec![participant("CA1")]);
    });

    let options = ConferenceOptions {
        min_participants: 2,
        ..ConferenceOptions::default()
    };
    let result = validator.validate_conference("CF1", &options).await.unwrap();

    assert!(!result.success);
    let participants = result.check(CheckKind::Participants).unwrap();
    assert!(participants.message.contains("only 1 participants"));
    assert!(result.check(CheckKind::ConferenceInsights).is_none());
}

#[tokio::test]
async fn test_completed_conference_checks_insights() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.conferences.ok("CF2", conference("CF2", "completed"));
        s.conference_summaries
            .ok("CF2", conference_summary("CF2", ProcessingState::Complete));
        s.participant_summaries.ok(
            "CF2",
            vec![participant_summary("CP1", "CA1"), participant_summary("CP2", "CA2")],
        );
    });

    let result = validator
        .validate_conference("CF2", &ConferenceOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.check(CheckKind::Participants).is_none());
    assert!(result.check(CheckKind::ConferenceInsights).unwrap().passed);
    assert!(result.check(CheckKind::ParticipantInsights).unwrap().passed);
}

#[tokio::test]
async fn test_conference_insights_not_found_is_timing() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.conferences.ok("CF3", conference("CF3", "completed"));
        s.conference_summaries
            .err("CF3", ClientError::not_found("ConferenceSummary", "CF3"));
        s.participant_summaries
            .ok("CF3", vec![participant_summary("CP1", "CA1")]);
    });

    let result = validator
        .validate_conference("CF3", &ConferenceOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    let insights = result.check(CheckKind::ConferenceInsights).unwrap();
    assert!(insights.passed);
    assert!(insights.message.contains("not yet available"));
    assert!(insights.message.contains("timing"));
}

#[tokio::test]
async fn test_participant_insights_api_error_fails() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.conferences.ok("CF4", conference("CF4", "completed"));
        s.conference_summaries
            .ok("CF4", conference_summary("CF4", ProcessingState::Complete));
        s.participant_summaries
            .err("CF4", ClientError::api(500, None, "Internal error"));
    });

    let result = validator
        .validate_conference("CF4", &ConferenceOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.check(CheckKind::ConferenceInsights).unwrap().passed);
    let participants = result.check(CheckKind::ParticipantInsights).unwrap();
    assert!(!participants.passed);
    assert!(participants.message.contains("Failed to fetch participant insights"));
}

// ============================================================================
// Media
// ============================================================================

#[tokio::test]
async fn test_zero_length_recording_fails() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.recordings
            .ok("RE1", recording("RE1", "processing", None))
            .ok("RE1", recording("RE1", "completed", Some(0)));
    });

    let result = validator
        .validate_recording("RE1", &ValidateOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.check(CheckKind::ResourceStatus).unwrap().passed);
    assert!(!result.check(CheckKind::RecordingDuration).unwrap().passed);
}

#[tokio::test]
async fn test_transcript_sentence_minimum() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.transcript_fetches
            .ok("GT1", transcript("GT1", "CA1", "completed"));
        s.sentences.ok("GT1", sentences(&["hello", "hi there"]));
    });

    let options = TranscriptOptions {
        min_sentences: 3,
        ..TranscriptOptions::default()
    };
    let result = validator.validate_transcript("GT1", &options).await.unwrap();

    assert!(!result.success);
    let check = result.check(CheckKind::Sentences).unwrap();
    assert!(check.message.contains("only 2 sentences, expected at least 3"));
}

// ============================================================================
// Sync and conversation
// ============================================================================

#[tokio::test]
async fn test_sync_document_structure() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.sync_documents.ok(
            "ET1",
            sync_document("ET1", json!({ "status": "booked", "slots": [1, 2] })),
        );
    });

    let result = validator
        .validate_sync_document(
            "IS1",
            "ET1",
            &[
                KeySpec::required("status"),
                KeySpec::required("slots").with_type(JsonType::Object),
            ],
        )
        .await
        .unwrap();

    assert!(!result.success);
    let contents = result.check(CheckKind::Contents).unwrap();
    assert!(!contents.passed);
    assert!(result.check(CheckKind::ResourceStatus).unwrap().passed);
}

#[tokio::test]
async fn test_sync_list_and_map() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.sync_lists.ok("ES1", sync_list_items(3));
        s.sync_maps.ok(
            "MP1",
            vec![sync_map_item("caller", json!({ "name": "Ada", "verified": true }))],
        );
    });

    let list = validator.validate_sync_list("IS1", "ES1", 2).await.unwrap();
    assert!(list.success);

    let map = validator
        .validate_sync_map(
            "IS1",
            "MP1",
            &[KeySpec::required("caller.verified").with_type(JsonType::Bool)],
        )
        .await
        .unwrap();
    assert!(map.success);

    let missing = validator.validate_sync_list("IS1", "ES404", 1).await.unwrap();
    assert!(!missing.success);
    assert!(missing.check(CheckKind::Contents).is_none());
}

#[tokio::test]
async fn test_conversation_message_count() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.conversations.ok("CH1", conversation("CH1", "active"));
        s.conversation_messages.ok(
            "CH1",
            vec![conversation_message("IM1", "Hi"), conversation_message("IM2", "Hello")],
        );
    });

    let options = ConversationOptions {
        min_messages: 2,
        ..ConversationOptions::default()
    };
    let result = validator.validate_conversation("CH1", &options).await.unwrap();

    assert!(result.success);
    assert!(result.check(CheckKind::Messages).unwrap().passed);
}
