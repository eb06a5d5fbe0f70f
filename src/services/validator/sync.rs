use serde_json::{json, Map, Value};

use deep_validate_checks::{
    checks, Check, CheckKind, CheckOutcome, KeySpec, ResourceKind, ResultAggregator,
    ValidationResult,
};
use deep_validate_core::VendorClient;

use super::DeepValidator;
use crate::utils::error::AppResult;

/// Shared-state objects have no lifecycle; existence is their status.
fn exists(kind: ResourceKind, sid: &str, data: Value) -> CheckOutcome {
    CheckOutcome::new(
        Check::passed(
            CheckKind::ResourceStatus,
            format!("{} {} exists", kind.display_name(), sid),
        )
        .with_data(data),
    )
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a sync document's data against the expected keys.
    pub async fn validate_sync_document(
        &self,
        service_sid: &str,
        sid: &str,
        expected_keys: &[KeySpec],
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::SyncDocument;
        let mut agg = ResultAggregator::new(kind, sid);

        let fetched = self.client.fetch_sync_document(service_sid, sid).await.map(Some);
        if let Some(document) = self.settle_primary(&mut agg, kind, sid, fetched)? {
            agg.record(exists(
                kind,
                sid,
                json!({ "revision": document.revision, "uniqueName": document.unique_name }),
            ));
            agg.record(checks::structural(
                CheckKind::Contents,
                &format!("Sync document {}", sid),
                &document.data,
                expected_keys,
            ));
        }

        Ok(agg.finish())
    }

    /// Validate that a sync list holds at least `min_items` items.
    pub async fn validate_sync_list(
        &self,
        service_sid: &str,
        sid: &str,
        min_items: usize,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::SyncList;
        let mut agg = ResultAggregator::new(kind, sid);

        let fetched = self.client.list_sync_list_items(service_sid, sid).await.map(Some);
        if let Some(items) = self.settle_primary(&mut agg, kind, sid, fetched)? {
            agg.record(exists(kind, sid, json!({ "itemCount": items.len() })));
            agg.record(checks::minimum_count(
                CheckKind::Contents,
                &format!("Sync list {}", sid),
                "items",
                items.len(),
                min_items,
            ));
        }

        Ok(agg.finish())
    }

    /// Validate a sync map's keys. Each map item is one top-level key of
    /// the checked object, so dotted specs reach into item data.
    pub async fn validate_sync_map(
        &self,
        service_sid: &str,
        sid: &str,
        expected_keys: &[KeySpec],
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::SyncMap;
        let mut agg = ResultAggregator::new(kind, sid);

        let fetched = self.client.list_sync_map_items(service_sid, sid).await.map(Some);
        if let Some(items) = self.settle_primary(&mut agg, kind, sid, fetched)? {
            agg.record(exists(kind, sid, json!({ "itemCount": items.len() })));
            let contents: Map<String, Value> =
                items.into_iter().map(|item| (item.key, item.data)).collect();
            agg.record(checks::structural(
                CheckKind::Contents,
                &format!("Sync map {}", sid),
                &Value::Object(contents),
                expected_keys,
            ));
        }

        Ok(agg.finish())
    }
}
