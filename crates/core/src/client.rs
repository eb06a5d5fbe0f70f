//! Vendor Client Abstraction
//!
//! The `VendorClient` trait is the only seam between the validation engine and
//! the telephony/messaging vendor. Implementations translate loosely-typed
//! REST/SDK responses into the record structs below at the fetch boundary, so
//! nothing downstream ever sees a vendor payload shape.
//!
//! Tests substitute an in-memory fake implementing the same trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientResult;

// ============================================================================
// Primary resources
// ============================================================================

/// A single outbound or inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub sid: String,
    pub status: String,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub to: String,
    pub from: String,
    pub date_sent: Option<DateTime<Utc>>,
}

/// A single call leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub sid: String,
    pub status: String,
    pub direction: String,
    /// Billable duration in seconds; absent until the call ends
    pub duration_secs: Option<u64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// A verification attempt within a verify service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub sid: String,
    pub service_sid: String,
    pub status: String,
    pub channel: String,
    pub to: String,
}

/// A task-router task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub sid: String,
    pub workspace_sid: String,
    pub assignment_status: String,
    /// Task attributes, already decoded from the vendor's JSON string
    pub attributes: Value,
    pub reason: Option<String>,
    pub age_secs: u64,
}

/// A reservation offered to a worker for a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRecord {
    pub sid: String,
    pub reservation_status: String,
    pub worker_sid: String,
}

/// A conference room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceRecord {
    pub sid: String,
    pub status: String,
    pub friendly_name: String,
}

/// A participant currently or previously in a conference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub call_sid: String,
    pub status: String,
}

/// A call recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingRecord {
    pub sid: String,
    pub call_sid: Option<String>,
    pub status: String,
    /// Seconds; the vendor reports -1 while the recording is still processing
    pub duration_secs: Option<i64>,
}

/// A conversation (multi-channel messaging thread).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub sid: String,
    pub state: String,
}

/// A message posted to a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessageRecord {
    pub sid: String,
    pub author: String,
    pub body: Option<String>,
}

// ============================================================================
// Debugger / alert log
// ============================================================================

/// Severity of a debugger alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warning,
    Notice,
    Debug,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Error => write!(f, "error"),
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Notice => write!(f, "notice"),
            AlertLevel::Debug => write!(f, "debug"),
        }
    }
}

/// An entry in the vendor's error/debugger log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub sid: String,
    pub log_level: AlertLevel,
    pub error_code: Option<i64>,
    pub resource_sid: Option<String>,
    pub alert_text: String,
    pub date_created: DateTime<Utc>,
}

/// Time-windowed alert query scoped to one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub resource_sid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// ============================================================================
// Analytics (insights)
// ============================================================================

/// Whether analytics data is still settling or has been locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Partial,
    Complete,
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingState::Partial => write!(f, "partial"),
            ProcessingState::Complete => write!(f, "complete"),
        }
    }
}

/// Per-call analytics summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSummaryRecord {
    pub call_sid: String,
    pub call_state: Option<String>,
    pub processing_state: ProcessingState,
    pub duration_secs: Option<u64>,
}

/// Per-conference analytics summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceSummaryRecord {
    pub conference_sid: String,
    pub status: Option<String>,
    pub processing_state: ProcessingState,
    pub max_concurrent_participants: Option<u32>,
}

/// Per-participant analytics summary within a conference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummaryRecord {
    pub participant_sid: String,
    pub call_sid: String,
    pub processing_state: ProcessingState,
}

// ============================================================================
// Transcripts
// ============================================================================

/// A transcript produced by the conversational intelligence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRecord {
    pub sid: String,
    pub service_sid: String,
    pub status: String,
    /// Call the transcript was sourced from, when the vendor reports it
    pub call_sid: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
}

/// Filter used to locate transcripts for a call leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptQuery {
    pub service_sid: Option<String>,
    pub call_sid: Option<String>,
}

/// One recognised utterance within a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceRecord {
    pub sentence_index: u32,
    /// Audio channel (speaker) the sentence was attributed to
    pub media_channel: u32,
    pub transcript: String,
    pub confidence: Option<f64>,
}

// ============================================================================
// Shared state documents
// ============================================================================

/// A shared JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDocumentRecord {
    pub sid: String,
    pub unique_name: Option<String>,
    pub revision: String,
    pub data: Value,
}

/// An item within a shared list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncListItemRecord {
    pub index: u64,
    pub data: Value,
}

/// An item within a shared map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMapItemRecord {
    pub key: String,
    pub data: Value,
}

// ============================================================================
// VendorClient
// ============================================================================

/// Async access to every vendor data source the validators read.
///
/// Implementations must report 404s as `ClientError::NotFound` (or an `Api`
/// error with status 404) and reserve `Transport`/`Parse` for failures of the
/// client itself.
#[async_trait]
pub trait VendorClient: Send + Sync {
    /// Fetch a message by SID.
    async fn fetch_message(&self, sid: &str) -> ClientResult<MessageRecord>;

    /// Fetch a call by SID.
    async fn fetch_call(&self, sid: &str) -> ClientResult<CallRecord>;

    /// Fetch a verification by service and SID.
    async fn fetch_verification(
        &self,
        service_sid: &str,
        sid: &str,
    ) -> ClientResult<VerificationRecord>;

    /// Fetch a task-router task.
    async fn fetch_task(&self, workspace_sid: &str, task_sid: &str) -> ClientResult<TaskRecord>;

    /// List the reservations created for a task.
    async fn list_task_reservations(
        &self,
        workspace_sid: &str,
        task_sid: &str,
    ) -> ClientResult<Vec<ReservationRecord>>;

    /// Fetch a conference by SID.
    async fn fetch_conference(&self, sid: &str) -> ClientResult<ConferenceRecord>;

    /// List the participants of a conference.
    async fn list_conference_participants(
        &self,
        conference_sid: &str,
    ) -> ClientResult<Vec<ParticipantRecord>>;

    /// Fetch a recording by SID.
    async fn fetch_recording(&self, sid: &str) -> ClientResult<RecordingRecord>;

    /// Fetch a conversation by SID.
    async fn fetch_conversation(&self, sid: &str) -> ClientResult<ConversationRecord>;

    /// List the messages of a conversation.
    async fn list_conversation_messages(
        &self,
        conversation_sid: &str,
    ) -> ClientResult<Vec<ConversationMessageRecord>>;

    /// List debugger alerts in a time window scoped to a resource.
    async fn list_alerts(&self, query: &AlertQuery) -> ClientResult<Vec<AlertRecord>>;

    /// Fetch the analytics summary for a call.
    async fn fetch_call_summary(&self, call_sid: &str) -> ClientResult<CallSummaryRecord>;

    /// Fetch the analytics summary for a conference.
    async fn fetch_conference_summary(
        &self,
        conference_sid: &str,
    ) -> ClientResult<ConferenceSummaryRecord>;

    /// List per-participant analytics summaries for a conference.
    async fn list_participant_summaries(
        &self,
        conference_sid: &str,
    ) -> ClientResult<Vec<ParticipantSummaryRecord>>;

    /// List transcripts matching a filter, newest first.
    async fn list_transcripts(&self, query: &TranscriptQuery)
        -> ClientResult<Vec<TranscriptRecord>>;

    /// Fetch a transcript by SID.
    async fn fetch_transcript(&self, sid: &str) -> ClientResult<TranscriptRecord>;

    /// List the sentences of a transcript in order.
    async fn list_transcript_sentences(
        &self,
        transcript_sid: &str,
    ) -> ClientResult<Vec<SentenceRecord>>;

    /// Fetch a shared document.
    async fn fetch_sync_document(
        &self,
        service_sid: &str,
        sid: &str,
    ) -> ClientResult<SyncDocumentRecord>;

    /// List the items of a shared list.
    async fn list_sync_list_items(
        &self,
        service_sid: &str,
        list_sid: &str,
    ) -> ClientResult<Vec<SyncListItemRecord>>;

    /// List the items of a shared map.
    async fn list_sync_map_items(
        &self,
        service_sid: &str,
        map_sid: &str,
    ) -> ClientResult<Vec<SyncMapItemRecord>>;
}
