//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_resource_deleter;
mod in_memory_inventory_provider;
mod mode_action_executor;
mod tracing_audit_sink;

pub use http_resource_deleter::HttpResourceDeleter;
pub use in_memory_inventory_provider::InMemoryInventoryProvider;
pub use mode_action_executor::ModeActionExecutor;
pub use tracing_audit_sink::TracingAuditSink;
