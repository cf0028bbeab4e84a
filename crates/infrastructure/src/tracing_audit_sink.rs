//! Audit sink writing retirement events to tracing output.

use async_trait::async_trait;
use tagsweep_application::{AuditSink, DecisionRecord, RetirementEvent};
use tagsweep_core::AppResult;
use tagsweep_domain::Outcome;
use tracing::{debug, error, info, warn};

/// Audit sink that logs every retirement event as a structured tracing event.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates a tracing audit sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn record_decision(record: &DecisionRecord) {
        let decision = &record.decision;
        let delete_by = decision
            .delete_by
            .map(|date| date.to_rfc3339())
            .unwrap_or_default();

        match decision.outcome {
            Outcome::Skip => debug!(
                subscription_id = %record.subscription_id,
                resource_group = %record.resource_group_name,
                resource_id = decision.resource.id(),
                outcome = decision.outcome.as_str(),
                reason = %decision.reason,
                "resource skipped"
            ),
            Outcome::DeleteNow => info!(
                subscription_id = %record.subscription_id,
                resource_group = %record.resource_group_name,
                resource_id = decision.resource.id(),
                resource_name = decision.resource.name(),
                resource_type = decision.resource.resource_type().unwrap_or_default(),
                outcome = decision.outcome.as_str(),
                mode = record.mode.as_str(),
                delete_by = %delete_by,
                reason = %decision.reason,
                "resource due for retirement"
            ),
            Outcome::DeferUntil => info!(
                subscription_id = %record.subscription_id,
                resource_group = %record.resource_group_name,
                resource_id = decision.resource.id(),
                outcome = decision.outcome.as_str(),
                delete_by = %delete_by,
                reason = %decision.reason,
                "resource retirement deferred"
            ),
            Outcome::AbortUnsafe => error!(
                subscription_id = %record.subscription_id,
                resource_group = %record.resource_group_name,
                resource_id = decision.resource.id(),
                outcome = decision.outcome.as_str(),
                mode = record.mode.as_str(),
                reason = %decision.reason,
                "resource retirement aborted for safety"
            ),
        }
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: RetirementEvent) -> AppResult<()> {
        match &event {
            RetirementEvent::Decision(record) => Self::record_decision(record),
            RetirementEvent::ActionFailed {
                resource_id,
                mode,
                error,
            } => warn!(
                resource_id = %resource_id,
                mode = mode.as_str(),
                error = %error,
                "retirement action failed"
            ),
            RetirementEvent::ScopeFailed {
                subscription_id,
                resource_group_name,
                error,
            } => warn!(
                subscription_id = %subscription_id,
                resource_group = resource_group_name.as_deref().unwrap_or("<all>"),
                error = %error,
                "inventory scope skipped"
            ),
            RetirementEvent::Summary(summary) => info!(
                subscriptions_processed = summary.subscriptions_processed,
                resource_groups_processed = summary.resource_groups_processed,
                resources_checked = summary.resources_checked,
                resources_marked_for_deletion = summary.resources_marked_for_deletion,
                resources_deferred = summary.resources_deferred,
                resources_aborted_unsafe = summary.resources_aborted_unsafe,
                actions_succeeded = summary.actions_succeeded,
                actions_failed = summary.actions_failed,
                scopes_failed = summary.scopes_failed,
                interrupted = summary.interrupted,
                "retirement run summary"
            ),
        }

        Ok(())
    }
}
