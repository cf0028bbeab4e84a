//! Application services and ports.

#![forbid(unsafe_code)]

mod decision_engine;
mod deferred_deletion;
mod retirement_ports;
mod scope_walker;

pub use decision_engine::{RetirementDecider, RetirementDecisionEngine};
pub use deferred_deletion::{DeferredVerdict, resolve_deferred_deletion};
pub use retirement_ports::{
    ActionExecutor, AuditSink, DecisionRecord, InventoryProvider, ResourceDeleter,
    ResourceGroupSummary, RetirementEvent, SubscriptionSummary,
};
pub use scope_walker::{
    ResolvedSubscriptions, RunCancellation, RunCancellationHandle, RunScope, ScopeWalker,
};
