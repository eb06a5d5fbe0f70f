use chrono::Utc;
use serde::{Deserialize, Serialize};

use deep_validate_checks::{
    checks, CheckKind, CheckOutcome, ResourceKind, ResultAggregator, ValidationResult,
};
use deep_validate_core::VendorClient;

use super::{listing_or_failed, DeepValidator, ValidateOptions};
use crate::utils::error::AppResult;

/// Options for `validate_conference`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceOptions {
    #[serde(flatten)]
    pub base: ValidateOptions,
    /// Minimum connected participants while the conference is live
    pub min_participants: usize,
}

impl Default for ConferenceOptions {
    fn default() -> Self {
        Self {
            base: ValidateOptions::default(),
            min_participants: 1,
        }
    }
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a conference.
    ///
    /// Live conferences get a participant count check; completed ones get
    /// the conference and participant analytics checks instead, since the
    /// participant listing only covers connected participants.
    pub async fn validate_conference(
        &self,
        sid: &str,
        options: &ConferenceOptions,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::Conference;
        let mut agg = ResultAggregator::new(kind, sid);

        // The conference stays in-progress while anyone is connected, so
        // only a single snapshot is taken.
        let fetched = self.client.fetch_conference(sid).await.map(Some);
        let conference = self.settle_primary(&mut agg, kind, sid, fetched)?;

        let Some(conference) = conference else {
            if let Some(alerts) = self.optional_alerts(sid, options.base.include_alerts).await? {
                agg.record(alerts);
            }
            return Ok(agg.finish());
        };

        agg.primary_status(conference.status.clone());
        agg.record(checks::resource_status(
            kind,
            sid,
            &conference.status,
            None,
            &options.base.expected_statuses,
        ));

        let completed = kind.is_terminal(&conference.status);
        let subject = format!("conference {}", sid);

        let sub_checks = async {
            let mut outcomes: Vec<CheckOutcome> = Vec::new();
            if !completed {
                let listing = self.client.list_conference_participants(sid).await;
                let listing =
                    listing_or_failed(CheckKind::Participants, "conference participants", listing)?;
                match listing {
                    Ok(participants) => outcomes.push(checks::minimum_count(
                        CheckKind::Participants,
                        &format!("Conference {}", sid),
                        "participants",
                        participants.len(),
                        options.min_participants,
                    )),
                    Err(failed) => outcomes.push(failed),
                }
            } else if self.config.check_insights {
                // Completion time is not exposed on the conference resource.
                let now = Utc::now();
                let (summary, participants) = tokio::join!(
                    self.client.fetch_conference_summary(sid),
                    self.client.list_participant_summaries(sid)
                );
                outcomes.push(checks::insights_summary(
                    CheckKind::ConferenceInsights,
                    &subject,
                    summary,
                    None,
                    now,
                )?);
                outcomes.push(checks::participant_insights(&subject, participants, None, now)?);
            }
            AppResult::Ok(outcomes)
        };
        let (alerts, sub_checks) = tokio::join!(
            self.optional_alerts(sid, options.base.include_alerts),
            sub_checks
        );

        for outcome in sub_checks? {
            agg.record(outcome);
        }
        if let Some(alerts) = alerts? {
            agg.record(alerts);
        }

        Ok(agg.finish())
    }
}
