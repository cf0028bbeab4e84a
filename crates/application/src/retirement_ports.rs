mod action_executor;
mod audit;
mod inventory;

pub use action_executor::{ActionExecutor, ResourceDeleter};
pub use audit::{AuditSink, DecisionRecord, RetirementEvent};
pub use inventory::{InventoryProvider, ResourceGroupSummary, SubscriptionSummary};
