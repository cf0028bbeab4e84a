use async_trait::async_trait;
use tagsweep_core::AppResult;
use tagsweep_domain::{Decision, ExecutionMode, RunSummary};

/// Decision together with the scope it was taken in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    /// Subscription that contains the resource.
    pub subscription_id: String,
    /// Resource group that contains the resource.
    pub resource_group_name: String,
    /// Mode the run executes under.
    pub mode: ExecutionMode,
    /// Decision taken for the resource.
    pub decision: Decision,
}

/// Structured event emitted during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetirementEvent {
    /// A resource was evaluated.
    Decision(DecisionRecord),
    /// The executor failed for a resource that was due.
    ActionFailed {
        /// Resource identifier.
        resource_id: String,
        /// Mode the executor ran under.
        mode: ExecutionMode,
        /// Failure description.
        error: String,
    },
    /// A subscription or resource group could not be listed and was skipped.
    ScopeFailed {
        /// Subscription being walked.
        subscription_id: String,
        /// Resource group, when the failure happened inside one.
        resource_group_name: Option<String>,
        /// Failure description.
        error: String,
    },
    /// The walk finished, completely or after cancellation.
    Summary(RunSummary),
}

/// Port receiving the audit trail of a walk.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records one event.
    async fn record(&self, event: RetirementEvent) -> AppResult<()>;
}
