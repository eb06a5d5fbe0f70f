use deep_validate_checks::{checks, ResourceKind, ResultAggregator, ValidationResult};
use deep_validate_core::{MessageRecord, VendorClient};

use super::{DeepValidator, ValidateOptions};
use crate::utils::error::AppResult;

fn message_status(record: &MessageRecord) -> &str {
    &record.status
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a sent message: delivery status, vendor error code and
    /// debugger alerts.
    pub async fn validate_message(
        &self,
        sid: &str,
        options: &ValidateOptions,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::Message;
        let mut agg = ResultAggregator::new(kind, sid);

        let fetched = self
            .fetch_settled(kind, move || self.client.fetch_message(sid), message_status)
            .await;

        if let Some(message) = self.settle_primary(&mut agg, kind, sid, fetched)? {
            agg.primary_status(message.status.clone());
            agg.record(checks::resource_status(
                kind,
                sid,
                &message.status,
                message.error_code,
                &options.expected_statuses,
            ));
            if let Some(text) = message.error_message.as_deref() {
                if !kind.is_success(&message.status) {
                    agg.warn(format!("Vendor reported: {}", text));
                }
            }
        }

        if let Some(alerts) = self.optional_alerts(sid, options.include_alerts).await? {
            agg.record(alerts);
        }

        Ok(agg.finish())
    }
}

