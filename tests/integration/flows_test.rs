//! Flow Orchestrator Integration Tests
//!
//! Covers result merging, the always-present debugger entry, diagnosis and
//! learning capture with capture enabled and disabled.

use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;

use deep_validate::{
    AppError, ClientError, FailureCategory, FlowOrchestrator, KeySpec, LearningCapture,
    MessagingFlow, PatternTracker, SyncDocumentTarget, TaskRouterFlow, ValidatorConfig,
    VerificationFlow, VoiceAiFlow, DEBUGGER_KEY,
};
use deep_validate_core::AlertLevel;

use super::fake_client::*;
use super::{fast_config, validator_with};

fn keys<V>(map: &std::collections::BTreeMap<String, V>) -> Vec<&str> {
    map.keys().map(|k| k.as_str()).collect()
}

#[tokio::test]
async fn test_voice_ai_flow_includes_optional_validators() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.calls.ok("CA1", call("CA1", "completed", Some(Utc::now())));
        s.recordings.ok("RE1", recording("RE1", "completed", Some(30)));
    });
    let orchestrator = FlowOrchestrator::new(validator, "session-voice");

    let flow = VoiceAiFlow {
        call_sid: "CA1".to_string(),
        recording_sid: Some("RE1".to_string()),
        ..VoiceAiFlow::default()
    };
    let result = orchestrator.voice_ai_flow(&flow).await.unwrap();

    assert!(result.all_passed);
    assert_eq!(keys(&result.results), vec!["call", "debugger", "recording"]);
    assert_eq!(result.summary.total_validators, 3);
    assert_eq!(result.summary.passed, 3);
    assert!(result.diagnoses.is_empty());
    assert!(result.learnings.is_empty());

    // Only the flow-level debugger entry scans the alert log.
    let queries = client.alert_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].resource_sid, "CA1");
}

#[tokio::test]
async fn test_failed_flow_captures_learnings_and_patterns() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.ok("SM1", message("SM1", "undelivered", Some(30007)));
    });
    let orchestrator = FlowOrchestrator::new(validator, "session-sms");

    let flow = MessagingFlow {
        message_sid: "SM1".to_string(),
        ..MessagingFlow::default()
    };
    let first = orchestrator.messaging_flow(&flow).await.unwrap();

    assert!(!first.all_passed);
    assert_eq!(first.summary.failed, 1);
    assert_eq!(first.diagnoses.len(), 1);
    assert_eq!(first.diagnoses[0].category, FailureCategory::CarrierRejection);
    assert_eq!(first.diagnoses[0].validator, "message");
    assert_eq!(first.learnings.len(), 1);
    assert_eq!(first.patterns.len(), 1);
    assert_eq!(first.patterns[0].signature, "carrier_rejection:message:30007");
    assert_eq!(first.patterns[0].occurrences, 1);

    let second = orchestrator.messaging_flow(&flow).await.unwrap();
    assert_eq!(second.patterns[0].occurrences, 2);

    let learnings = LearningCapture::new(temp.path())
        .load("session-sms")
        .await
        .unwrap();
    assert_eq!(learnings.len(), 2);
    let patterns = PatternTracker::new(temp.path())
        .load("session-sms")
        .await
        .unwrap();
    assert_eq!(patterns.len(), 2);
}

#[tokio::test]
async fn test_capture_disabled_keeps_arrays_empty() {
    let temp = TempDir::new().unwrap();
    let config = ValidatorConfig::builder()
        .poll_timeout(std::time::Duration::from_secs(1))
        .poll_interval(std::time::Duration::from_millis(10))
        .log_dir(temp.path())
        .build()
        .unwrap();
    let (client, validator) = validator_with(config);
    client.script(|s| {
        s.messages.ok("SM2", message("SM2", "failed", Some(30003)));
    });
    let orchestrator =
        FlowOrchestrator::new(validator, "session-off").with_capture_learnings(false);
    assert!(!orchestrator.capture_enabled());

    let flow = MessagingFlow {
        message_sid: "SM2".to_string(),
        ..MessagingFlow::default()
    };
    let result = orchestrator.messaging_flow(&flow).await.unwrap();

    assert!(!result.all_passed);
    assert_eq!(result.diagnoses.len(), 1);
    assert!(result.learnings.is_empty());
    assert!(result.patterns.is_empty());
    assert!(!temp.path().join("session-off").exists());
}

#[tokio::test]
async fn test_debugger_failure_is_diagnosed() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.verifications.ok("VE1", verification("VE1", "approved"));
        s.messages.ok("SM3", message("SM3", "delivered", None));
        s.alerts = vec![alert("VE1", AlertLevel::Error, 60200, "Invalid parameter")];
    });
    let orchestrator = FlowOrchestrator::new(validator, "session-verify");

    let flow = VerificationFlow {
        service_sid: "VA1".to_string(),
        verification_sid: "VE1".to_string(),
        message_sid: Some("SM3".to_string()),
    };
    let result = orchestrator.verification_flow(&flow).await.unwrap();

    assert!(!result.all_passed);
    assert_eq!(keys(&result.results), vec!["debugger", "message", "verification"]);
    assert!(result.results["verification"].success);
    assert!(!result.results[DEBUGGER_KEY].success);
    assert_eq!(result.diagnoses.len(), 1);
    assert_eq!(result.diagnoses[0].category, FailureCategory::AlertRaised);
    assert_eq!(result.diagnoses[0].error_code, Some(60200));
}

#[tokio::test]
async fn test_task_router_flow() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.tasks.ok("WT1", task("WT1", "assigned", json!({ "language": "en" })));
        s.reservations.ok("WT1", vec![reservation("WR1", "accepted")]);
        s.calls.ok("CA9", call("CA9", "completed", Some(Utc::now())));
    });
    let orchestrator =
        FlowOrchestrator::new(validator, "session-task").with_capture_learnings(false);

    let flow = TaskRouterFlow {
        workspace_sid: "WS1".to_string(),
        task_sid: "WT1".to_string(),
        call_sid: Some("CA9".to_string()),
        expected_attributes: vec![KeySpec::required("language")],
    };
    let result = orchestrator.task_router_flow(&flow).await.unwrap();

    assert!(result.all_passed);
    assert_eq!(keys(&result.results), vec!["call", "debugger", "task"]);
}

#[tokio::test]
async fn test_messaging_flow_with_sync_document() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.ok("SM4", message("SM4", "delivered", None));
        s.sync_documents
            .ok("ET1", sync_document("ET1", json!({ "reply": "YES" })));
    });
    let orchestrator = FlowOrchestrator::new(validator, "session-sync");

    let flow = MessagingFlow {
        message_sid: "SM4".to_string(),
        conversation_sid: None,
        sync_document: Some(SyncDocumentTarget {
            service_sid: "IS1".to_string(),
            document_sid: "ET1".to_string(),
            expected_keys: vec![KeySpec::required("reply")],
        }),
    };
    let result = orchestrator.messaging_flow(&flow).await.unwrap();

    assert!(result.all_passed);
    assert_eq!(keys(&result.results), vec!["debugger", "message", "sync_document"]);
}

#[tokio::test]
async fn test_transport_failure_bypasses_capture() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.messages.err("SM5", ClientError::transport("dns failure"));
    });
    let orchestrator = FlowOrchestrator::new(validator, "session-broken");

    let flow = MessagingFlow {
        message_sid: "SM5".to_string(),
        ..MessagingFlow::default()
    };
    let err = orchestrator.messaging_flow(&flow).await.unwrap_err();

    assert!(matches!(err, AppError::Client(_)));
    assert!(!temp.path().join("session-broken").exists());
}

#[tokio::test]
async fn test_flow_runs_on_spawned_task() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.calls.ok("CA7", call("CA7", "completed", Some(Utc::now())));
    });
    let orchestrator = std::sync::Arc::new(FlowOrchestrator::new(validator, "session-spawned"));

    let handle = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move {
            let flow = VoiceAiFlow {
                call_sid: "CA7".to_string(),
                ..VoiceAiFlow::default()
            };
            orchestrator.voice_ai_flow(&flow).await
        }
    });
    let result = handle.await.unwrap().unwrap();

    assert!(result.all_passed);
    assert_eq!(keys(&result.results), vec!["call", "debugger"]);
}
