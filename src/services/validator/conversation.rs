use serde::{Deserialize, Serialize};

use deep_validate_checks::{checks, CheckKind, ResourceKind, ResultAggregator, ValidationResult};
use deep_validate_core::VendorClient;

use super::{listing_or_failed, DeepValidator, ValidateOptions};
use crate::utils::error::AppResult;

/// Options for `validate_conversation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationOptions {
    #[serde(flatten)]
    pub base: ValidateOptions,
    pub min_messages: usize,
}

impl Default for ConversationOptions {
    fn default() -> Self {
        Self {
            base: ValidateOptions::default(),
            min_messages: 1,
        }
    }
}

impl<C: VendorClient + ?Sized> DeepValidator<C> {
    /// Validate a conversation: state, message count and debugger alerts.
    pub async fn validate_conversation(
        &self,
        sid: &str,
        options: &ConversationOptions,
    ) -> AppResult<ValidationResult> {
        let kind = ResourceKind::Conversation;
        let mut agg = ResultAggregator::new(kind, sid);

        // Conversations stay active indefinitely; no terminal wait.
        let fetched = self.client.fetch_conversation(sid).await.map(Some);
        if let Some(conversation) = self.settle_primary(&mut agg, kind, sid, fetched)? {
            agg.primary_status(conversation.state.clone());
            agg.record(checks::resource_status(
                kind,
                sid,
                &conversation.state,
                None,
                &options.base.expected_statuses,
            ));

            let listing = self.client.list_conversation_messages(sid).await;
            let listing = listing_or_failed(CheckKind::Messages, "conversation messages", listing)?;
            let outcome = match listing {
                Ok(messages) => checks::minimum_count(
                    CheckKind::Messages,
                    &format!("Conversation {}", sid),
                    "messages",
                    messages.len(),
                    options.min_messages,
                ),
                Err(failed) => failed,
            };
            agg.record(outcome);
        }

        if let Some(alerts) = self.optional_alerts(sid, options.base.include_alerts).await? {
            agg.record(alerts);
        }

        Ok(agg.finish())
    }
}
