use serde::{Deserialize, Serialize};
use serde_json::json;

use deep_validate_checks::{
    checks, Check, CheckKind, CheckOutcome, ResourceKind, ResultAggregator, ValidationResult,
};
use deep_validate_core::{RecordingRecord, TranscriptRecord, VendorClient};

use super::{listing_or_failed, DeepValidator, ValidateOptions};
use crate::utils::error::AppResult;

/// Options for `validate_transcript`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptOptions {
    #[serde(flatten)]
    pub base: ValidateOptions,
    pub min_sentences: usize,
}

impl Default for TranscriptOptions {
    fn default() -> Self {
        Self {
            base: ValidateOptions::default(),
            min_sentences: 1,
        }
    }
}

fn recording_status(record: &RecordingRecord) -> &str {
    &record.status
}

fn transcript_status(record: &TranscriptRecord) -> &str {
    &record.status
}

/// A completed recording must have a positive duration.
fn recording_duration(recording: &RecordingRecord) -> CheckOutcome {
    let data = json!({ "durationSecs": recording.duration_secs });
    let check = match recording.duration_secs {
        Some(secs) if secs > 0 => Check::passed(
            CheckKind::RecordingDuration,
            format!("Recording {} is {}s long", recording.sid, secs),
        ),
        Some(_) => Check::failed(
            CheckKind::RecordingDuration,
            format!("Recording {} is zero-length", recording.sid),
        ),
        None => Check::failed(
            CheckKind::RecordingDuration,
            format!("Recording {} reports no duration", recording.sid),
        ),
    };
    CheckOutcome::new(check.with_data(data))
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a recording: status, non-zero duration and debugger alerts.
    pub async fn validate_recording(
        &self,
        sid: &str,
        options: &ValidateOptions,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::Recording;
        let mut agg = ResultAggregator::new(kind, sid);

        let fetched = self
            .fetch_settled(kind, move || self.client.fetch_recording(sid), recording_status)
            .await;

        if let Some(recording) = self.settle_primary(&mut agg, kind, sid, fetched)? {
            agg.primary_status(recording.status.clone());
            agg.record(checks::resource_status(
                kind,
                sid,
                &recording.status,
                None,
                &options.expected_statuses,
            ));
            if recording.status.eq_ignore_ascii_case("completed") {
                agg.record(recording_duration(&recording));
            }
        }

        if let Some(alerts) = self.optional_alerts(sid, options.include_alerts).await? {
            agg.record(alerts);
        }

        Ok(agg.finish())
    }

    /// Validate a transcript: processing status and sentence count.
    pub async fn validate_transcript(
        &self,
        sid: &str,
        options: &TranscriptOptions,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::Transcript;
        let mut agg = ResultAggregator::new(kind, sid);

        let fetched = self
            .fetch_settled(kind, move || self.client.fetch_transcript(sid), transcript_status)
            .await;

        if let Some(transcript) = self.settle_primary(&mut agg, kind, sid, fetched)? {
            agg.primary_status(transcript.status.clone());
            agg.record(checks::resource_status(
                kind,
                sid,
                &transcript.status,
                None,
                &options.base.expected_statuses,
            ));

            if kind.is_success(&transcript.status) {
                let listing = self.client.list_transcript_sentences(sid).await;
                let listing =
                    listing_or_failed(CheckKind::Sentences, "transcript sentences", listing)?;
                let outcome = match listing {
                    Ok(sentences) => checks::minimum_count(
                        CheckKind::Sentences,
                        &format!("Transcript {}", sid),
                        "sentences",
                        sentences.len(),
                        options.min_sentences,
                    ),
                    Err(failed) => failed,
                };
                agg.record(outcome);
            }
        }

        if let Some(alerts) = self.optional_alerts(sid, options.base.include_alerts).await? {
            agg.record(alerts);
        }

        Ok(agg.finish())
    }
}
