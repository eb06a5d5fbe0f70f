//! Learning Capture
//!
//! Persists diagnosed flow failures for the downstream self-healing loop:
//! learnings (one record per diagnosis) and failure patterns (recurring
//! signatures with occurrence counts). Both are session-scoped JSON-lines
//! append logs.

mod capture;
mod log;
mod patterns;

pub use capture::LearningCapture;
pub use log::AppendLog;
pub use patterns::PatternTracker;
