//! Business Flows
//!
//! Multi-resource flow validation and failure diagnosis.

mod diagnosis;
mod orchestrator;

pub use diagnosis::{diagnose, CARRIER_ERROR_CODES};
pub use orchestrator::{
    CaptureSinks, FlowOrchestrator, MessagingFlow, SyncDocumentTarget, TaskRouterFlow,
    VerificationFlow, VoiceAiFlow, DEBUGGER_KEY,
};
