//! Result Aggregator
//!
//! Collects the check outcomes for one resource into a `ValidationResult`:
//! failed checks become `errors`, soft issues become `warnings`, and
//! `success` is the conjunction over the checks that were actually recorded.
//! Checks that did not apply are never recorded and so never count.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::models::{Check, CheckKind, CheckOutcome, ResourceKind, ValidationResult};

/// Builder for a single resource's verdict.
#[derive(Debug)]
pub struct ResultAggregator {
    resource_type: ResourceKind,
    resource_sid: String,
    primary_status: Option<String>,
    started: Instant,
    checks: BTreeMap<CheckKind, Check>,
    warnings: Vec<String>,
}

impl ResultAggregator {
    /// Start aggregating; the duration clock starts now.
    pub fn new(resource_type: ResourceKind, resource_sid: impl Into<String>) -> Self {
        Self {
            resource_type,
            resource_sid: resource_sid.into(),
            primary_status: None,
            started: Instant::now(),
            checks: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Set the resource's primary status as last observed.
    pub fn primary_status(&mut self, status: impl Into<String>) -> &mut Self {
        self.primary_status = Some(status.into());
        self
    }

    /// Record a check outcome. Recording the same check twice keeps the later one.
    pub fn record(&mut self, outcome: CheckOutcome) -> &mut Self {
        let CheckOutcome { check, warnings } = outcome;
        self.warnings.extend(warnings);
        self.checks.insert(check.name, check);
        self
    }

    /// Add a soft issue that is not tied to a check.
    pub fn warn(&mut self, warning: impl Into<String>) -> &mut Self {
        self.warnings.push(warning.into());
        self
    }

    /// Whether every recorded check so far passed.
    pub fn all_passed(&self) -> bool {
        self.checks.values().all(|c| c.passed)
    }

    /// Finalize into an immutable result.
    pub fn finish(self) -> ValidationResult {
        let errors: Vec<String> = self
            .checks
            .values()
            .filter(|c| !c.passed)
            .map(|c| format!("{}: {}", c.name, c.message))
            .collect();
        let success = self.checks.values().all(|c| c.passed);
        let duration = self.started.elapsed().as_millis() as u64;

        if success {
            tracing::debug!(
                resource = %self.resource_type,
                sid = %self.resource_sid,
                checks = self.checks.len(),
                "Validation passed"
            );
        } else {
            tracing::info!(
                resource = %self.resource_type,
                sid = %self.resource_sid,
                errors = errors.len(),
                "Validation failed"
            );
        }

        ValidationResult {
            resource_type: self.resource_type,
            resource_sid: self.resource_sid,
            primary_status: self.primary_status,
            success,
            duration,
            checks: self.checks,
            errors,
            warnings: self.warnings,
        }
    }
}
