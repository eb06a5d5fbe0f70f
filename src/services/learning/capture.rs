//! Learning capture: one structured record per diagnosed failure.

use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use super::log::AppendLog;
use crate::models::flow::{Diagnosis, Learning};
use crate::utils::error::AppResult;

/// Writes learnings to `<log_dir>/<session>/learnings.jsonl`.
#[derive(Debug)]
pub struct LearningCapture {
    log: AppendLog,
}

impl LearningCapture {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log: AppendLog::new(log_dir, "learnings"),
        }
    }

    /// Record a diagnosis as a learning.
    pub async fn record(&self, session_id: &str, diagnosis: &Diagnosis) -> AppResult<Learning> {
        let learning = Learning {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            recorded_at: Utc::now(),
            flow: diagnosis.flow.clone(),
            validator: diagnosis.validator.clone(),
            category: diagnosis.category,
            resource_sid: diagnosis.resource_sid.clone(),
            summary: diagnosis.summary.clone(),
            hint: diagnosis.hint.clone(),
            error_code: diagnosis.error_code,
        };
        self.log.append(session_id, &learning).await?;
        tracing::debug!(
            session = session_id,
            id = %learning.id,
            category = %learning.category,
            "Learning captured"
        );
        Ok(learning)
    }

    /// All learnings recorded for a session, oldest first.
    pub async fn load(&self, session_id: &str) -> AppResult<Vec<Learning>> {
        self.log.read_all(session_id).await
    }
}
