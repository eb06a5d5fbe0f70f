//! Pattern tracking: recurring failure signatures per session.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::log::AppendLog;
use crate::models::flow::{Diagnosis, Pattern};
use crate::utils::error::AppResult;

#[derive(Debug, Clone, Copy)]
struct Seen {
    occurrences: u32,
    first_seen: DateTime<Utc>,
}

/// Counts failure signatures per session and appends every occurrence to
/// `<log_dir>/<session>/patterns.jsonl`.
///
/// Counts are seeded from the session's log the first time the session is
/// touched, so they survive a restart.
#[derive(Debug)]
pub struct PatternTracker {
    log: AppendLog,
    sessions: Mutex<HashMap<String, HashMap<String, Seen>>>,
}

impl PatternTracker {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log: AppendLog::new(log_dir, "patterns"),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Stable signature for a diagnosis: `category:resource:code`.
    pub fn signature(diagnosis: &Diagnosis) -> String {
        let code = diagnosis
            .error_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string());
        format!("{}:{}:{}", diagnosis.category, diagnosis.resource_type, code)
    }

    /// Count one occurrence and append the resulting pattern record.
    pub async fn track(&self, session_id: &str, diagnosis: &Diagnosis) -> AppResult<Pattern> {
        let signature = Self::signature(diagnosis);
        let now = Utc::now();

        let mut sessions = self.sessions.lock().await;
        if !sessions.contains_key(session_id) {
            let seeded = self.seed(session_id).await?;
            sessions.insert(session_id.to_string(), seeded);
        }
        let counts = sessions.entry(session_id.to_string()).or_default();
        let (occurrences, first_seen) = counts
            .get(&signature)
            .map_or((1, now), |seen| (seen.occurrences + 1, seen.first_seen));

        let pattern = Pattern {
            signature,
            session_id: session_id.to_string(),
            category: diagnosis.category,
            resource_type: diagnosis.resource_type,
            error_code: diagnosis.error_code,
            occurrences,
            first_seen,
            last_seen: now,
            example_sid: diagnosis.resource_sid.clone(),
        };
        // Appended under the counts lock so log order matches counts; the
        // count only advances once the record is on disk.
        self.log.append(session_id, &pattern).await?;
        counts.insert(
            pattern.signature.clone(),
            Seen {
                occurrences,
                first_seen,
            },
        );

        if pattern.occurrences > 1 {
            tracing::info!(
                session = session_id,
                signature = %pattern.signature,
                occurrences = pattern.occurrences,
                "Recurring failure pattern"
            );
        }
        Ok(pattern)
    }

    /// Occurrences of `signature` in a session so far.
    pub async fn occurrences(&self, session_id: &str, signature: &str) -> AppResult<u32> {
        let mut sessions = self.sessions.lock().await;
        if !sessions.contains_key(session_id) {
            let seeded = self.seed(session_id).await?;
            sessions.insert(session_id.to_string(), seeded);
        }
        Ok(sessions
            .get(session_id)
            .and_then(|counts| counts.get(signature))
            .map_or(0, |seen| seen.occurrences))
    }

    /// Every pattern record of a session, oldest first.
    pub async fn load(&self, session_id: &str) -> AppResult<Vec<Pattern>> {
        self.log.read_all(session_id).await
    }

    /// Latest record of each signature seen at least `min_occurrences` times.
    pub async fn recurring(
        &self,
        session_id: &str,
        min_occurrences: u32,
    ) -> AppResult<Vec<Pattern>> {
        let mut latest: HashMap<String, Pattern> = HashMap::new();
        for pattern in self.load(session_id).await? {
            latest.insert(pattern.signature.clone(), pattern);
        }
        let mut recurring: Vec<Pattern> = latest
            .into_values()
            .filter(|p| p.occurrences >= min_occurrences)
            .collect();
        recurring.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.signature.cmp(&b.signature))
        });
        Ok(recurring)
    }

    async fn seed(&self, session_id: &str) -> AppResult<HashMap<String, Seen>> {
        let mut counts: HashMap<String, Seen> = HashMap::new();
        for pattern in self.log.read_all::<Pattern>(session_id).await? {
            let seen = counts.entry(pattern.signature).or_insert(Seen {
                occurrences: 0,
                first_seen: pattern.first_seen,
            });
            seen.occurrences = seen.occurrences.max(pattern.occurrences);
            seen.first_seen = seen.first_seen.min(pattern.first_seen);
        }
        Ok(counts)
    }
}
