//! Deep Validate Checks
//!
//! The building blocks of a deep validation, independent of any particular
//! resource flow:
//!
//! - `models` - Check and result types (ResourceKind, CheckKind, Check, ValidationResult)
//! - `poller` - Fixed-interval terminal-state poller with a wall-clock budget
//! - `checks` - One check function per data source (status, debugger, insights, structure)
//! - `aggregator` - Combines check outcomes into a single verdict
//!
//! Per-resource validators and multi-resource flows live in the main crate.

pub mod aggregator;
pub mod checks;
pub mod models;
pub mod poller;

// Re-export core model types
pub use models::{Check, CheckKind, CheckOutcome, ResourceKind, ValidationResult};

// Re-export poller
pub use poller::{PollOptions, PollOutcome, StatusPoller};

// Re-export check functions
pub use checks::{
    debugger_alerts, insights_summary, minimum_count, participant_insights, resource_fetch_failed,
    resource_status, structural, InsightsRecord, JsonType, KeySpec,
    INSIGHTS_FINAL_WINDOW_MINUTES, INSIGHTS_PARTIAL_WINDOW_MINUTES,
};

// Re-export aggregator
pub use aggregator::ResultAggregator;
