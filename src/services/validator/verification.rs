use serde_json::json;

use deep_validate_checks::{checks, ResourceKind, ResultAggregator, ValidationResult};
use deep_validate_core::{VendorClient, VerificationRecord};

use super::{DeepValidator, ValidateOptions};
use crate::utils::error::AppResult;

fn verification_status(record: &VerificationRecord) -> &str {
    &record.status
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a verification attempt; only `approved` counts as success.
    pub async fn validate_verification(
        &self,
        service_sid: &str,
        sid: &str,
        options: &ValidateOptions,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::Verification;
        let mut agg = ResultAggregator::new(kind, sid);

        let fetched = self
            .fetch_settled(
                kind,
                move || self.client.fetch_verification(service_sid, sid),
                verification_status,
            )
            .await;

        if let Some(verification) = self.settle_primary(&mut agg, kind, sid, fetched)? {
            agg.primary_status(verification.status.clone());
            let mut outcome = checks::resource_status(
                kind,
                sid,
                &verification.status,
                None,
                &options.expected_statuses,
            );
            if let Some(data) = outcome.check.data.as_mut() {
                data["channel"] = json!(verification.channel);
            }
            agg.record(outcome);
        }

        if let Some(alerts) = self.optional_alerts(sid, options.include_alerts).await? {
            agg.record(alerts);
        }

        Ok(agg.finish())
    }
}
