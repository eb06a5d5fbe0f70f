//! Deep Validate
//!
//! Deep validation engine for asynchronous telephony and messaging
//! operations. Instead of trusting a synchronous acknowledgement, each
//! validation cross-references the resource's status endpoint, the
//! debugger log, analytics summaries and sub-resources, polling until the
//! backend settles.
//!
//! It includes:
//! - Per-resource validators (`DeepValidator::validate_*`)
//! - A two-leg conversation correlator
//! - Business-flow orchestration with failure diagnosis
//! - Learning capture and pattern tracking for self-healing pipelines
//!
//! The vendor API is consumed through the `VendorClient` trait; no client
//! is bundled.

pub mod models;
pub mod services;
pub mod utils;

// ── Engine ──
pub use services::flows::DEBUGGER_KEY;
pub use services::{
    diagnose, CaptureSinks, ConferenceOptions, ConversationOptions, DeepValidator,
    FlowOrchestrator, MessagingFlow, SyncDocumentTarget, TaskOptions, TaskRouterFlow,
    TranscriptOptions, ValidateOptions, VerificationFlow, VoiceAiFlow,
};

// ── Learning ──
pub use services::{AppendLog, LearningCapture, PatternTracker};

// ── Models ──
pub use models::{
    ConversationStats, Diagnosis, FailureCategory, FlowResult, FlowSummary, Learning, LegStats,
    Pattern, TwoWayOptions, TwoWayValidationResult, ValidatorConfig, ValidatorConfigBuilder,
};

// ── Checks and client seam ──
pub use deep_validate_checks::{
    Check, CheckKind, CheckOutcome, JsonType, KeySpec, PollOptions, ResourceKind,
    ResultAggregator, StatusPoller, ValidationResult,
};
pub use deep_validate_core::{ClientError, ClientResult, VendorClient};

pub use utils::error::{AppError, AppResult};
