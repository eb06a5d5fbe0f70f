use serde::{Deserialize, Serialize};
use serde_json::json;

use deep_validate_checks::{
    checks, Check, CheckKind, CheckOutcome, KeySpec, ResourceKind, ResultAggregator,
    ValidationResult,
};
use deep_validate_core::{ReservationRecord, VendorClient};

use super::{listing_or_failed, DeepValidator, ValidateOptions};
use crate::utils::error::AppResult;

/// Options for `validate_task`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskOptions {
    #[serde(flatten)]
    pub base: ValidateOptions,
    /// Keys the task's attributes document must carry
    pub expected_attributes: Vec<KeySpec>,
    /// Fail instead of warn when no reservation exists yet
    pub require_reservation: bool,
}

fn reservations_check(
    task_sid: &str,
    reservations: &[ReservationRecord],
    required: bool,
) -> CheckOutcome {
    let data = json!({
        "count": reservations.len(),
        "statuses": reservations.iter().map(|r| r.reservation_status.as_str()).collect::<Vec<_>>(),
    });

    if !reservations.is_empty() {
        return CheckOutcome::new(
            Check::passed(
                CheckKind::Reservations,
                format!("Task {} has {} reservation(s)", task_sid, reservations.len()),
            )
            .with_data(data),
        );
    }

    let message = format!("Task {} has no reservations yet", task_sid);
    if required {
        CheckOutcome::new(Check::failed(CheckKind::Reservations, message).with_data(data))
    } else {
        CheckOutcome::new(Check::passed(CheckKind::Reservations, message.clone()).with_data(data))
            .with_warning(message)
    }
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a routed task: assignment status, attributes, reservations
    /// and debugger alerts.
    ///
    /// Tasks can legitimately wait in `pending` for a long time, so the task
    /// is fetched once rather than polled.
    pub async fn validate_task(
        &self,
        workspace_sid: &str,
        task_sid: &str,
        options: &TaskOptions,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::Task;
        let mut agg = ResultAggregator::new(kind, task_sid);

        let fetched = self.client.fetch_task(workspace_sid, task_sid).await.map(Some);
        let task = self.settle_primary(&mut agg, kind, task_sid, fetched)?;

        if let Some(task) = &task {
            agg.primary_status(task.assignment_status.clone());
            let mut status = checks::resource_status(
                kind,
                task_sid,
                &task.assignment_status,
                None,
                &options.base.expected_statuses,
            );
            if let Some(reason) = task.reason.as_deref() {
                if !kind.is_success(&task.assignment_status) {
                    status = status.with_warning(format!("Task {} reason: {}", task_sid, reason));
                }
            }
            agg.record(status);

            if !options.expected_attributes.is_empty() {
                agg.record(checks::structural(
                    CheckKind::TaskAttributes,
                    &format!("Task {} attributes", task_sid),
                    &task.attributes,
                    &options.expected_attributes,
                ));
            }
        }

        let reservations = async {
            if task.is_none() {
                return Ok(None);
            }
            let listing = self
                .client
                .list_task_reservations(workspace_sid, task_sid)
                .await;
            listing_or_failed(CheckKind::Reservations, "task reservations", listing).map(|r| {
                Some(match r {
                    Ok(reservations) => {
                        reservations_check(task_sid, &reservations, options.require_reservation)
                    }
                    Err(failed) => failed,
                })
            })
        };
        let (alerts, reservations) = tokio::join!(
            self.optional_alerts(task_sid, options.base.include_alerts),
            reservations
        );

        for outcome in [reservations?, alerts?].into_iter().flatten() {
            agg.record(outcome);
        }

        Ok(agg.finish())
    }
}
