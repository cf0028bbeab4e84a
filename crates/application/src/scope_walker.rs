use std::sync::Arc;

use chrono::{DateTime, Utc};
use tagsweep_core::AppResult;
use tagsweep_domain::{Outcome, ResourceNode, RetirementPolicy, RunSummary};
use tracing::{debug, error, info, warn};

use crate::decision_engine::RetirementDecider;
use crate::retirement_ports::{
    ActionExecutor, AuditSink, DecisionRecord, InventoryProvider, RetirementEvent,
    SubscriptionSummary,
};

mod cancellation;
mod scope;

pub use cancellation::{RunCancellation, RunCancellationHandle};
pub use scope::{ResolvedSubscriptions, RunScope};

/// Walks subscription, resource group and resource scopes and applies the
/// retirement decision to every resource in scope.
#[derive(Clone)]
pub struct ScopeWalker {
    inventory: Arc<dyn InventoryProvider>,
    decider: Arc<dyn RetirementDecider>,
    action_executor: Arc<dyn ActionExecutor>,
    audit_sink: Arc<dyn AuditSink>,
}

struct ResourceGroupScope<'a> {
    subscription_id: &'a str,
    resource_group_name: &'a str,
}

impl ScopeWalker {
    /// Creates a scope walker.
    #[must_use]
    pub fn new(
        inventory: Arc<dyn InventoryProvider>,
        decider: Arc<dyn RetirementDecider>,
        action_executor: Arc<dyn ActionExecutor>,
        audit_sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            inventory,
            decider,
            action_executor,
            audit_sink,
        }
    }

    /// Runs one walk, evaluating every resource against the current time.
    pub async fn run(
        &self,
        scope: &RunScope,
        policy: &RetirementPolicy,
        cancellation: &RunCancellation,
    ) -> AppResult<RunSummary> {
        self.run_at(scope, policy, Utc::now(), cancellation).await
    }

    /// Runs one walk, evaluating every resource against `now`.
    ///
    /// Only configuration problems and a failure to list subscriptions
    /// abort the walk. Everything after that point is isolated per scope or
    /// per resource, and the returned summary covers what was processed,
    /// including after cancellation.
    pub async fn run_at(
        &self,
        scope: &RunScope,
        policy: &RetirementPolicy,
        now: DateTime<Utc>,
        cancellation: &RunCancellation,
    ) -> AppResult<RunSummary> {
        scope.validate()?;
        let listed = match self.inventory.list_subscriptions().await {
            Ok(listed) => listed,
            Err(list_error) => {
                let summary = RunSummary {
                    scopes_failed: 1,
                    ..RunSummary::default()
                };
                error!(error = %list_error, "unable to list subscriptions; nothing was walked");
                self.emit(RetirementEvent::Summary(summary)).await;
                return Err(list_error);
            }
        };
        let ResolvedSubscriptions {
            selected: subscriptions,
            unresolved,
        } = scope.resolve_subscriptions(listed)?;

        info!(
            subscriptions = subscriptions.len(),
            mode = %policy.mode(),
            tag_rule = %policy.tag_rule(),
            delete_by_tag_key = policy.delete_by_tag_key(),
            date_format = %policy.date_format(),
            now = %now.to_rfc3339(),
            "retirement walk started"
        );

        let mut summary = RunSummary::default();
        for subscription_id in unresolved {
            self.scope_failed(
                &mut summary,
                subscription_id.as_str(),
                None,
                "configured subscription is not visible in the inventory".to_owned(),
            )
            .await;
        }

        for subscription in &subscriptions {
            if cancellation.is_cancelled() {
                summary.interrupted = true;
                break;
            }

            self.walk_subscription(subscription, scope, policy, now, cancellation, &mut summary)
                .await;
            if summary.interrupted {
                break;
            }
        }

        if summary.interrupted {
            warn!(
                resources_checked = summary.resources_checked,
                "retirement walk cancelled; returning partial summary"
            );
        }

        info!(
            subscriptions_processed = summary.subscriptions_processed,
            resource_groups_processed = summary.resource_groups_processed,
            resources_checked = summary.resources_checked,
            resources_marked_for_deletion = summary.resources_marked_for_deletion,
            resources_deferred = summary.resources_deferred,
            resources_aborted_unsafe = summary.resources_aborted_unsafe,
            actions_failed = summary.actions_failed,
            scopes_failed = summary.scopes_failed,
            interrupted = summary.interrupted,
            "retirement walk finished"
        );
        self.emit(RetirementEvent::Summary(summary)).await;

        Ok(summary)
    }

    async fn walk_subscription(
        &self,
        subscription: &SubscriptionSummary,
        scope: &RunScope,
        policy: &RetirementPolicy,
        now: DateTime<Utc>,
        cancellation: &RunCancellation,
        summary: &mut RunSummary,
    ) {
        summary.subscriptions_processed += 1;
        info!(
            subscription_id = %subscription.id,
            subscription_name = %subscription.display_name,
            "processing subscription"
        );

        let resource_groups = match self.inventory.list_resource_groups(&subscription.id).await {
            Ok(resource_groups) => resource_groups,
            Err(error) => {
                self.scope_failed(summary, &subscription.id, None, error.to_string())
                    .await;
                return;
            }
        };

        for resource_group in resource_groups
            .iter()
            .filter(|resource_group| scope.includes_resource_group(&resource_group.name))
        {
            if cancellation.is_cancelled() {
                summary.interrupted = true;
                return;
            }

            summary.resource_groups_processed += 1;
            debug!(
                subscription_id = %subscription.id,
                resource_group = %resource_group.name,
                "processing resource group"
            );

            let resources = match self
                .inventory
                .list_resources(&subscription.id, &resource_group.name)
                .await
            {
                Ok(resources) => resources,
                Err(error) => {
                    self.scope_failed(
                        summary,
                        &subscription.id,
                        Some(resource_group.name.as_str()),
                        error.to_string(),
                    )
                    .await;
                    continue;
                }
            };

            let group_scope = ResourceGroupScope {
                subscription_id: &subscription.id,
                resource_group_name: &resource_group.name,
            };
            for resource in &resources {
                if cancellation.is_cancelled() {
                    summary.interrupted = true;
                    return;
                }

                self.process_resource(&group_scope, resource, policy, now, summary)
                    .await;
            }
        }
    }

    async fn process_resource(
        &self,
        group_scope: &ResourceGroupScope<'_>,
        resource: &ResourceNode,
        policy: &RetirementPolicy,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) {
        let decision = self.decider.decide(resource, policy, now);
        let outcome = decision.outcome;
        summary.record_outcome(outcome);

        if outcome == Outcome::AbortUnsafe {
            error!(
                subscription_id = group_scope.subscription_id,
                resource_group = group_scope.resource_group_name,
                resource_id = resource.id(),
                reason = %decision.reason,
                "unsafe delete-by tag; resource left untouched"
            );
        }

        self.emit(RetirementEvent::Decision(DecisionRecord {
            subscription_id: group_scope.subscription_id.to_owned(),
            resource_group_name: group_scope.resource_group_name.to_owned(),
            mode: policy.mode(),
            decision,
        }))
        .await;

        if outcome != Outcome::DeleteNow {
            return;
        }

        match self.action_executor.execute(policy.mode(), resource).await {
            Ok(()) => summary.actions_succeeded += 1,
            Err(action_error) => {
                summary.actions_failed += 1;
                warn!(
                    resource_id = resource.id(),
                    mode = %policy.mode(),
                    error = %action_error,
                    "retirement action failed"
                );
                self.emit(RetirementEvent::ActionFailed {
                    resource_id: resource.id().to_owned(),
                    mode: policy.mode(),
                    error: action_error.to_string(),
                })
                .await;
            }
        }
    }

    async fn scope_failed(
        &self,
        summary: &mut RunSummary,
        subscription_id: &str,
        resource_group_name: Option<&str>,
        scope_error: String,
    ) {
        summary.scopes_failed += 1;
        warn!(
            subscription_id,
            resource_group = resource_group_name.unwrap_or("<all>"),
            error = %scope_error,
            "inventory scope unavailable; skipping"
        );
        self.emit(RetirementEvent::ScopeFailed {
            subscription_id: subscription_id.to_owned(),
            resource_group_name: resource_group_name.map(ToOwned::to_owned),
            error: scope_error,
        })
        .await;
    }

    async fn emit(&self, event: RetirementEvent) {
        if let Err(sink_error) = self.audit_sink.record(event).await {
            warn!(error = %sink_error, "failed to record retirement event");
        }
    }
}
