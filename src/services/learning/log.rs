//! Session-scoped JSON-lines append log.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::utils::error::{AppError, AppResult};

/// Append-only JSON-lines file per session: `<root>/<session>/<name>.jsonl`.
///
/// Appends are serialized through one lock so records from concurrent
/// validations never interleave.
#[derive(Debug)]
pub struct AppendLog {
    root: PathBuf,
    name: String,
    lock: Mutex<()>,
}

impl AppendLog {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the session's log file.
    pub fn path_for(&self, session_id: &str) -> AppResult<PathBuf> {
        validate_session_id(session_id)?;
        Ok(self
            .root
            .join(session_id)
            .join(format!("{}.jsonl", self.name)))
    }

    /// Append one record as a single line.
    pub async fn append<T: Serialize>(&self, session_id: &str, record: &T) -> AppResult<()> {
        let path = self.path_for(session_id)?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read every record of a session. A missing log reads as empty;
    /// unparseable lines are skipped.
    pub async fn read_all<T: DeserializeOwned>(&self, session_id: &str) -> AppResult<Vec<T>> {
        let path = self.path_for(session_id)?;

        let _guard = self.lock.lock().await;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping unreadable log record"
                ),
            }
        }
        Ok(records)
    }
}

/// Session ids become directory names, so they must be a single path segment.
fn validate_session_id(session_id: &str) -> AppResult<()> {
    if session_id.trim().is_empty() {
        return Err(AppError::validation("Session id cannot be empty"));
    }
    if session_id.contains('/') || session_id.contains('\\') || session_id.contains("..") {
        return Err(AppError::validation(format!(
            "Invalid session id: {}",
            session_id
        )));
    }
    Ok(())
}
