//! Flow Orchestrator
//!
//! Runs the validators relevant to one business flow and merges their
//! results. Optional identifiers add validators; every flow also scans the
//! debugger log for its primary resource under the `debugger` key.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::{try_join_all, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

use deep_validate_checks::{KeySpec, ResourceKind, ValidationResult};
use deep_validate_core::VendorClient;

use super::diagnosis::diagnose;
use crate::models::flow::{Diagnosis, FlowResult, FlowSummary, Learning, Pattern};
use crate::services::learning::{LearningCapture, PatternTracker};
use crate::services::validator::{
    ConferenceOptions, ConversationOptions, DeepValidator, TaskOptions, TranscriptOptions,
    ValidateOptions,
};
use crate::utils::error::AppResult;

/// Result key of the debugger scan present in every flow.
pub const DEBUGGER_KEY: &str = "debugger";

/// Inputs for the voice AI flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAiFlow {
    pub call_sid: String,
    pub recording_sid: Option<String>,
    pub transcript_sid: Option<String>,
    pub conference_sid: Option<String>,
}

/// Inputs for the verification flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationFlow {
    pub service_sid: String,
    pub verification_sid: String,
    /// Message that carried the code, if sent over SMS
    pub message_sid: Option<String>,
}

/// Inputs for the task router flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRouterFlow {
    pub workspace_sid: String,
    pub task_sid: String,
    /// Call routed by the task, if any
    pub call_sid: Option<String>,
    #[serde(default)]
    pub expected_attributes: Vec<KeySpec>,
}

/// A sync document written as part of a messaging flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDocumentTarget {
    pub service_sid: String,
    pub document_sid: String,
    #[serde(default)]
    pub expected_keys: Vec<KeySpec>,
}

/// Inputs for the messaging flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingFlow {
    pub message_sid: String,
    pub conversation_sid: Option<String>,
    pub sync_document: Option<SyncDocumentTarget>,
}

type Keyed<'a> = BoxFuture<'a, AppResult<(String, ValidationResult)>>;

fn keyed<'a, F>(key: &str, validation: F) -> Keyed<'a>
where
    F: std::future::Future<Output = AppResult<ValidationResult>> + Send + 'a,
{
    let key = key.to_string();
    validation.map(move |result| result.map(|r| (key, r))).boxed()
}

/// Learning capture and pattern tracking, shared between orchestrators.
#[derive(Debug, Clone)]
pub struct CaptureSinks {
    pub learnings: Arc<LearningCapture>,
    pub patterns: Arc<PatternTracker>,
}

/// Runs business-flow validations for one session.
pub struct FlowOrchestrator<C: ?Sized> {
    validator: Arc<DeepValidator<C>>,
    session_id: String,
    capture: Option<CaptureSinks>,
}

impl<C: VendorClient + ?Sized> FlowOrchestrator<C> {
    /// Create an orchestrator. Capture follows the validator's configuration.
    pub fn new(validator: Arc<DeepValidator<C>>, session_id: impl Into<String>) -> Self {
        let capture = validator.config().capture.enabled.then(|| {
            let dir = validator.config().capture.log_dir.clone();
            CaptureSinks {
                learnings: Arc::new(LearningCapture::new(dir.clone())),
                patterns: Arc::new(PatternTracker::new(dir)),
            }
        });
        Self {
            validator,
            session_id: session_id.into(),
            capture,
        }
    }

    /// Use externally owned sinks, e.g. to share them across sessions.
    pub fn with_capture(mut self, sinks: CaptureSinks) -> Self {
        self.capture = Some(sinks);
        self
    }

    /// Enable or disable learning capture. Disabling drops the sinks.
    pub fn with_capture_learnings(mut self, enabled: bool) -> Self {
        if !enabled {
            self.capture = None;
        } else if self.capture.is_none() {
            let dir = self.validator.config().capture.log_dir.clone();
            self.capture = Some(CaptureSinks {
                learnings: Arc::new(LearningCapture::new(dir.clone())),
                patterns: Arc::new(PatternTracker::new(dir)),
            });
        }
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn capture_enabled(&self) -> bool {
        self.capture.is_some()
    }

    /// Call, plus recording, transcript and conference when identified.
    pub async fn voice_ai_flow(&self, flow: &VoiceAiFlow) -> AppResult<FlowResult> {
        let v = &self.validator;
        let base = ValidateOptions::without_alerts();
        let transcript_options = TranscriptOptions {
            base: base.clone(),
            ..TranscriptOptions::default()
        };
        let conference_options = ConferenceOptions {
            base: base.clone(),
            ..ConferenceOptions::default()
        };

        let mut validations = vec![keyed("call", v.validate_call(&flow.call_sid, &base))];
        if let Some(sid) = &flow.recording_sid {
            validations.push(keyed("recording", v.validate_recording(sid, &base)));
        }
        if let Some(sid) = &flow.transcript_sid {
            validations.push(keyed("transcript", v.validate_transcript(sid, &transcript_options)));
        }
        if let Some(sid) = &flow.conference_sid {
            validations.push(keyed("conference", v.validate_conference(sid, &conference_options)));
        }

        self.run_flow("voice_ai", ResourceKind::Call, &flow.call_sid, validations)
            .await
    }

    /// Verification, plus the delivering message when identified.
    pub async fn verification_flow(&self, flow: &VerificationFlow) -> AppResult<FlowResult> {
        let v = &self.validator;
        let base = ValidateOptions::without_alerts();

        let mut validations = vec![keyed(
            "verification",
            v.validate_verification(&flow.service_sid, &flow.verification_sid, &base),
        )];
        if let Some(sid) = &flow.message_sid {
            validations.push(keyed("message", v.validate_message(sid, &base)));
        }

        self.run_flow(
            "verification",
            ResourceKind::Verification,
            &flow.verification_sid,
            validations,
        )
        .await
    }

    /// Task with its attributes and reservations, plus the routed call.
    pub async fn task_router_flow(&self, flow: &TaskRouterFlow) -> AppResult<FlowResult> {
        let v = &self.validator;
        let base = ValidateOptions::without_alerts();
        let task_options = TaskOptions {
            base: base.clone(),
            expected_attributes: flow.expected_attributes.clone(),
            require_reservation: false,
        };

        let mut validations = vec![keyed(
            "task",
            v.validate_task(&flow.workspace_sid, &flow.task_sid, &task_options),
        )];
        if let Some(sid) = &flow.call_sid {
            validations.push(keyed("call", v.validate_call(sid, &base)));
        }

        self.run_flow("task_router", ResourceKind::Task, &flow.task_sid, validations)
            .await
    }

    /// Message, plus conversation and sync document when identified.
    pub async fn messaging_flow(&self, flow: &MessagingFlow) -> AppResult<FlowResult> {
        let v = &self.validator;
        let base = ValidateOptions::without_alerts();
        let conversation_options = ConversationOptions {
            base: base.clone(),
            ..ConversationOptions::default()
        };

        let mut validations = vec![keyed("message", v.validate_message(&flow.message_sid, &base))];
        if let Some(sid) = &flow.conversation_sid {
            validations.push(keyed(
                "conversation",
                v.validate_conversation(sid, &conversation_options),
            ));
        }
        if let Some(target) = &flow.sync_document {
            validations.push(keyed(
                "sync_document",
                v.validate_sync_document(
                    &target.service_sid,
                    &target.document_sid,
                    &target.expected_keys,
                ),
            ));
        }

        self.run_flow("messaging", ResourceKind::Message, &flow.message_sid, validations)
            .await
    }

    async fn run_flow(
        &self,
        flow: &str,
        primary: ResourceKind,
        primary_sid: &str,
        validations: Vec<Keyed<'_>>,
    ) -> AppResult<FlowResult> {
        let started = Instant::now();

        let mut results: BTreeMap<String, ValidationResult> =
            try_join_all(validations).await?.into_iter().collect();
        let debugger = self.validator.validate_debugger(primary, primary_sid).await?;
        results.insert(DEBUGGER_KEY.to_string(), debugger);

        self.finish_flow(flow, results, started).await
    }

    async fn finish_flow(
        &self,
        flow: &str,
        results: BTreeMap<String, ValidationResult>,
        started: Instant,
    ) -> AppResult<FlowResult> {
        let passed = results.values().filter(|r| r.success).count();
        let summary = FlowSummary {
            total_validators: results.len(),
            passed,
            failed: results.len() - passed,
            duration: started.elapsed().as_millis() as u64,
        };
        let all_passed = results.values().all(|r| r.success);

        let diagnoses: Vec<Diagnosis> = results
            .iter()
            .filter_map(|(key, result)| diagnose(flow, key, result))
            .collect();

        if !all_passed {
            tracing::info!(
                flow,
                session = %self.session_id,
                failed = summary.failed,
                "Flow validation failed"
            );
        }

        let (learnings, patterns) = match &self.capture {
            Some(sinks) if !diagnoses.is_empty() => self.persist(sinks, &diagnoses).await,
            _ => (Vec::new(), Vec::new()),
        };

        Ok(FlowResult {
            results,
            summary,
            all_passed,
            diagnoses,
            learnings,
            patterns,
        })
    }

    /// Persist diagnoses. A write failure is logged and the record skipped;
    /// it never changes the flow's verdict.
    async fn persist(
        &self,
        sinks: &CaptureSinks,
        diagnoses: &[Diagnosis],
    ) -> (Vec<Learning>, Vec<Pattern>) {
        let mut learnings = Vec::new();
        let mut patterns = Vec::new();

        for diagnosis in diagnoses {
            match sinks.learnings.record(&self.session_id, diagnosis).await {
                Ok(learning) => learnings.push(learning),
                Err(e) => tracing::warn!(
                    session = %self.session_id,
                    validator = %diagnosis.validator,
                    error = %e,
                    "Failed to capture learning"
                ),
            }
            match sinks.patterns.track(&self.session_id, diagnosis).await {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => tracing::warn!(
                    session = %self.session_id,
                    validator = %diagnosis.validator,
                    error = %e,
                    "Failed to track failure pattern"
                ),
            }
        }

        (learnings, patterns)
    }
}
