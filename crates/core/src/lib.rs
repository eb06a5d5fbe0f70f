//! Deep Validate Core
//!
//! The vendor client seam and its error type for the Deep Validate
//! workspace. This crate has no validation logic of its own.
//!
//! ## Module Organization
//!
//! - `error` - Vendor client errors (`ClientError`, `ClientResult`)
//! - `client` - The `VendorClient` async trait and the typed records it returns
//!
//! ## Design Principles
//!
//! 1. **Small dependency set** - serde, async-trait, thiserror and chrono only
//! 2. **Trait-based abstractions** - fakes in tests, swappable vendor SDKs
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod client;
pub mod error;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{ClientError, ClientResult};

// ── Vendor Client ──────────────────────────────────────────────────────
pub use client::{
    AlertLevel, AlertQuery, AlertRecord, CallRecord, CallSummaryRecord, ConferenceRecord,
    ConferenceSummaryRecord, ConversationMessageRecord, ConversationRecord, MessageRecord,
    ParticipantRecord, ParticipantSummaryRecord, ProcessingState, RecordingRecord,
    ReservationRecord, SentenceRecord, SyncDocumentRecord, SyncListItemRecord, SyncMapItemRecord,
    TaskRecord, TranscriptQuery, TranscriptRecord, VendorClient, VerificationRecord,
};
