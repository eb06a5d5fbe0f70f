//! Two-Way Conversation Models
//!
//! Options and results for correlating the transcripts of two call legs.

use serde::{Deserialize, Serialize};

/// Options for a two-way conversation validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TwoWayOptions {
    /// Terms expected somewhere in the conversation; missing ones are warnings
    pub topic_keywords: Vec<String>,
    /// At least one of these must appear when the list is non-empty
    pub success_phrases: Vec<String>,
    /// Any hit fails the validation
    pub forbidden_patterns: Vec<String>,
    /// Minimum total turns across both legs
    pub expected_turns: Option<usize>,
    /// Minimum sentences on each leg
    pub min_sentences_per_side: Option<usize>,
    /// Minimum conversation length in seconds (not verifiable from transcripts)
    pub min_duration_secs: Option<u64>,
    /// Poll until transcripts finish processing instead of failing fast
    pub wait_for_transcripts: bool,
    /// Restrict the transcript lookup to one intelligence service
    pub intelligence_service_sid: Option<String>,
}

/// Per-leg transcript statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegStats {
    pub call_sid: String,
    pub transcript_sid: Option<String>,
    pub transcript_status: Option<String>,
    pub speaker_turns: usize,
    pub sentence_count: usize,
}

impl LegStats {
    pub fn new(call_sid: impl Into<String>) -> Self {
        Self {
            call_sid: call_sid.into(),
            ..Self::default()
        }
    }
}

/// Conversation-level heuristics over both legs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub total_turns: usize,
    pub topic_keywords_found: Vec<String>,
    pub topic_keywords_missing: Vec<String>,
    pub success_phrases_found: Vec<String>,
    pub forbidden_patterns_found: Vec<String>,
    pub has_natural_flow: bool,
}

/// Verdict for a two-leg conversation.
///
/// `success` is `errors.is_empty()`; warnings never affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoWayValidationResult {
    pub success: bool,
    pub call_a: LegStats,
    pub call_b: LegStats,
    pub conversation: ConversationStats,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Duration in milliseconds
    pub validation_duration: u64,
}
