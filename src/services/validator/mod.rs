//! Deep Validator
//!
//! Per-resource validation entry points (`validate_<kind>`). Each one runs a
//! fixed set of checks for its resource kind and aggregates them into a
//! `ValidationResult`:
//!
//! - primary resource fetch, polled to a terminal state when configured
//! - status check against the kind's success set
//! - debugger alert scan
//! - kind-specific sub-resource and analytics checks
//!
//! One `DeepValidator` is created per validation session and shared by
//! reference; there is no process-wide instance.

mod call;
mod conference;
mod conversation;
mod media;
mod message;
mod sync;
mod task;
mod verification;

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use deep_validate_checks::{
    checks, Check, CheckKind, CheckOutcome, ResourceKind, ResultAggregator, StatusPoller,
    ValidationResult,
};
use deep_validate_core::{ClientResult, VendorClient};

use crate::models::config::ValidatorConfig;
use crate::utils::error::AppResult;

pub use conference::ConferenceOptions;
pub use conversation::ConversationOptions;
pub use media::TranscriptOptions;
pub use task::TaskOptions;

/// Options shared by every per-resource validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateOptions {
    /// Overrides the kind's default success set when non-empty
    pub expected_statuses: Vec<String>,
    /// Include the debugger alert check
    pub include_alerts: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            expected_statuses: Vec::new(),
            include_alerts: true,
        }
    }
}

impl ValidateOptions {
    /// Options for validators run inside a flow, which scans the debugger
    /// log once on its own.
    pub fn without_alerts() -> Self {
        Self {
            include_alerts: false,
            ..Self::default()
        }
    }

    pub fn expecting(mut self, statuses: &[&str]) -> Self {
        self.expected_statuses = statuses.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The deep validation engine.
pub struct DeepValidator<C: ?Sized> {
    client: Arc<C>,
    config: ValidatorConfig,
    poller: StatusPoller,
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    pub fn new(client: Arc<C>, config: ValidatorConfig) -> Self {
        let poller = StatusPoller::new(config.poll.options());
        Self {
            client,
            config,
            poller,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub(crate) fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    /// Scan the debugger log for one resource as a standalone result.
    ///
    /// Flows use this as their always-present `debugger` entry.
    pub async fn validate_debugger(
        &self,
        kind: ResourceKind,
        resource_sid: &str,
    ) -> AppResult<ValidationResult> {
        let mut agg = ResultAggregator::new(kind, resource_sid);
        agg.record(self.alerts(resource_sid).await?);
        Ok(agg.finish())
    }

    /// Debugger check for `resource_sid` over the configured lookback.
    pub(crate) async fn alerts(&self, resource_sid: &str) -> AppResult<CheckOutcome> {
        let outcome = checks::debugger_alerts(
            self.client.as_ref(),
            resource_sid,
            self.config.alert_lookback(),
            Utc::now(),
        )
        .await?;
        Ok(outcome)
    }

    /// Debugger check when `include` is set.
    pub(crate) async fn optional_alerts(
        &self,
        resource_sid: &str,
        include: bool,
    ) -> AppResult<Option<CheckOutcome>> {
        if include {
            Ok(Some(self.alerts(resource_sid).await?))
        } else {
            Ok(None)
        }
    }

    /// Fetch a primary resource, polling to a terminal state when configured.
    ///
    /// `Ok(None)` means the poll budget ran out before any fetch completed.
    pub(crate) async fn fetch_settled<T, F, Fut>(
        &self,
        kind: ResourceKind,
        mut fetch: F,
        status_of: fn(&T) -> &str,
    ) -> ClientResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if !self.config.wait_for_terminal {
            return fetch().await.map(Some);
        }

        let outcome = self
            .poller
            .wait_for_terminal(fetch, |value: &T| kind.is_terminal(status_of(value)))
            .await?;

        if !outcome.reached_terminal {
            tracing::info!(
                resource = %kind,
                attempts = outcome.attempts,
                "Resource did not reach a terminal state within {}s",
                self.config.poll.timeout_secs
            );
        }
        Ok(outcome.value)
    }

    /// Record the primary fetch into the aggregator.
    ///
    /// Domain errors become a failed status check; unexpected client errors
    /// propagate. Returns the fetched record when there is one.
    pub(crate) fn settle_primary<T>(
        &self,
        agg: &mut ResultAggregator,
        kind: ResourceKind,
        sid: &str,
        fetched: ClientResult<Option<T>>,
    ) -> AppResult<Option<T>> {
        match fetched {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => {
                agg.record(CheckOutcome::new(Check::failed(
                    CheckKind::ResourceStatus,
                    format!(
                        "{} {} did not respond within {}s",
                        kind.display_name(),
                        sid,
                        self.config.poll.timeout_secs
                    ),
                )));
                Ok(None)
            }
            Err(e) if e.is_unexpected() => Err(e.into()),
            Err(e) => {
                tracing::info!(resource = %kind, sid, error = %e, "Primary fetch failed");
                agg.record(checks::resource_fetch_failed(kind, sid, &e));
                Ok(None)
            }
        }
    }
}

/// Propagate unexpected client errors, turn the rest into a failed check.
pub(crate) fn listing_or_failed<T>(
    kind: CheckKind,
    subject: &str,
    result: ClientResult<T>,
) -> AppResult<Result<T, CheckOutcome>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(e) if e.is_unexpected() => Err(e.into()),
        Err(e) => Ok(Err(CheckOutcome::new(Check::failed(
            kind,
            format!("Failed to list {}: {}", subject, e),
        )))),
    }
}
