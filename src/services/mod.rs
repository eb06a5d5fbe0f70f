//! Services
//!
//! The validation engine proper:
//! - `validator` - per-resource deep validators
//! - `two_way` - two-leg conversation correlator
//! - `flows` - business-flow orchestration and failure diagnosis
//! - `learning` - learning capture and pattern tracking

pub mod flows;
pub mod learning;
pub mod two_way;
pub mod validator;

pub use flows::{
    diagnose, CaptureSinks, FlowOrchestrator, MessagingFlow, SyncDocumentTarget, TaskRouterFlow,
    VerificationFlow, VoiceAiFlow,
};
pub use learning::{AppendLog, LearningCapture, PatternTracker};
pub use two_way::analyze_conversation;
pub use validator::{
    ConferenceOptions, ConversationOptions, DeepValidator, TaskOptions, TranscriptOptions,
    ValidateOptions,
};
