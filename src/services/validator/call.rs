use chrono::Utc;

use deep_validate_checks::{
    checks, CheckKind, CheckOutcome, ResourceKind, ResultAggregator, ValidationResult,
};
use deep_validate_core::{CallRecord, VendorClient};

use super::{DeepValidator, ValidateOptions};
use crate::utils::error::AppResult;

fn call_status(record: &CallRecord) -> &str {
    &record.status
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a call: final status, debugger alerts and, once the call
    /// has ended, its analytics summary.
    pub async fn validate_call(
        &self,
        sid: &str,
        options: &ValidateOptions,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::Call;
        let mut agg = ResultAggregator::new(kind, sid);

        let fetched = self
            .fetch_settled(kind, move || self.client.fetch_call(sid), call_status)
            .await;
        let call = self.settle_primary(&mut agg, kind, sid, fetched)?;

        let insights_due = call
            .as_ref()
            .map_or(false, |c| self.config.check_insights && kind.is_terminal(&c.status));
        let completed_at = call.as_ref().and_then(|c| c.end_time);

        if let Some(call) = &call {
            agg.primary_status(call.status.clone());
            agg.record(checks::resource_status(
                kind,
                sid,
                &call.status,
                None,
                &options.expected_statuses,
            ));
        }

        let insights = async {
            if !insights_due {
                return Ok(None);
            }
            let summary = self.client.fetch_call_summary(sid).await;
            checks::insights_summary(
                CheckKind::CallInsights,
                &format!("call {}", sid),
                summary,
                completed_at,
                Utc::now(),
            )
            .map(Some)
        };
        let (alerts, insights) = tokio::join!(
            self.optional_alerts(sid, options.include_alerts),
            insights
        );

        let insights: Option<CheckOutcome> = insights?;
        for outcome in [alerts?, insights].into_iter().flatten() {
            agg.record(outcome);
        }

        Ok(agg.finish())
    }
}
