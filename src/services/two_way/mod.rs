//! Two-Way Conversation Correlator
//!
//! Validates a conversation carried over two call legs by resolving each
//! leg's transcript, counting turns and running keyword, phrase and
//! threshold heuristics over the combined text.
//!
//! Transcripts are resolved by taking the first transcript the vendor
//! lists for the call. That lookup is not guaranteed to be unique when a
//! call has several transcripts.

mod analysis;

pub use analysis::{analyze_conversation, ConversationAnalysis, Leg};

use std::time::Instant;

use deep_validate_checks::ResourceKind;
use deep_validate_core::{TranscriptQuery, TranscriptRecord, VendorClient};

use crate::models::conversation::{LegStats, TwoWayOptions, TwoWayValidationResult};
use crate::services::validator::DeepValidator;
use crate::utils::error::AppResult;

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a two-leg conversation.
    ///
    /// `success` is true iff no errors were produced; warnings never affect
    /// it. Only unexpected client errors are returned as `Err`.
    pub async fn validate_two_way(
        &self,
        call_a: &str,
        call_b: &str,
        options: &TwoWayOptions,
    ) -> AppResult<TwoWayValidationResult> {
        let started = Instant::now();

        let (leg_a, leg_b) = tokio::join!(
            self.resolve_leg("Call A", call_a, options),
            self.resolve_leg("Call B", call_b, options)
        );
        let (leg_a, mut errors) = leg_a?;
        let (leg_b, errors_b) = leg_b?;
        errors.extend(errors_b);

        let analysis = analyze_conversation(&leg_a, &leg_b, options);
        errors.extend(analysis.errors);

        let success = errors.is_empty();
        if success {
            tracing::debug!(call_a, call_b, "Two-way validation passed");
        } else {
            tracing::info!(call_a, call_b, errors = errors.len(), "Two-way validation failed");
        }

        Ok(TwoWayValidationResult {
            success,
            call_a: leg_a.stats,
            call_b: leg_b.stats,
            conversation: analysis.stats,
            errors,
            warnings: analysis.warnings,
            validation_duration: started.elapsed().as_millis() as u64,
        })
    }

    /// Resolve one leg's transcript and sentences.
    ///
    /// Domain problems are returned as error strings next to the leg.
    async fn resolve_leg(
        &self,
        label: &'static str,
        call_sid: &str,
        options: &TwoWayOptions,
    ) -> AppResult<(Leg, Vec<String>)> {
        let mut leg = Leg {
            label,
            stats: LegStats::new(call_sid),
            sentences: Vec::new(),
        };

        let query = TranscriptQuery {
            service_sid: options.intelligence_service_sid.clone(),
            call_sid: Some(call_sid.to_string()),
        };
        let listed = match self.client().list_transcripts(&query).await {
            Ok(transcripts) => transcripts,
            Err(e) if e.is_unexpected() => return Err(e.into()),
            Err(e) => {
                return Ok((
                    leg,
                    vec![format!("Failed to list transcripts for call {}: {}", call_sid, e)],
                ));
            }
        };

        let Some(mut transcript) = listed.into_iter().next() else {
            return Ok((leg, vec![format!("No transcript found for call {}", call_sid)]));
        };

        let pending = !ResourceKind::Transcript.is_terminal(&transcript.status);
        if options.wait_for_transcripts && pending {
            transcript = self.await_transcript(transcript).await?;
        }

        leg.stats.transcript_sid = Some(transcript.sid.clone());
        leg.stats.transcript_status = Some(transcript.status.clone());

        if !transcript.status.eq_ignore_ascii_case("completed") {
            return Ok((
                leg,
                vec![format!(
                    "Transcript {} not completed (status: {})",
                    transcript.sid, transcript.status
                )],
            ));
        }

        match self.client().list_transcript_sentences(&transcript.sid).await {
            Ok(sentences) => {
                leg.stats.speaker_turns = sentences.len();
                leg.stats.sentence_count = sentences.len();
                leg.sentences = sentences;
                Ok((leg, Vec::new()))
            }
            Err(e) if e.is_unexpected() => Err(e.into()),
            Err(e) => Ok((
                leg,
                vec![format!(
                    "Failed to fetch sentences for transcript {}: {}",
                    transcript.sid, e
                )],
            )),
        }
    }

    /// Poll a transcript until it finishes processing, keeping the listed
    /// record if the refresh never completes.
    async fn await_transcript(&self, listed: TranscriptRecord) -> AppResult<TranscriptRecord> {
        let sid = listed.sid.clone();
        let sid_ref = sid.as_str();
        let polled = self
            .poller()
            .wait_for_terminal(
                move || self.client().fetch_transcript(sid_ref),
                |t: &TranscriptRecord| ResourceKind::Transcript.is_terminal(&t.status),
            )
            .await;

        match polled {
            Ok(outcome) => Ok(outcome.value.unwrap_or(listed)),
            Err(e) if e.is_unexpected() => Err(e.into()),
            Err(e) => {
                tracing::info!(transcript = %sid, error = %e, "Transcript refresh failed");
                Ok(listed)
            }
        }
    }
}
