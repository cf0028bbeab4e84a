use async_trait::async_trait;
use tagsweep_core::AppResult;
use tagsweep_domain::{ExecutionMode, ResourceNode};

/// Port applying the enforcement of `mode` to a resource that is due.
///
/// Only called for `DeleteNow` decisions, at most once per resource.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Executes the action for one resource.
    async fn execute(&self, mode: ExecutionMode, resource: &ResourceNode) -> AppResult<()>;
}

/// Port removing one resource from the cloud provider.
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
    /// Deletes the resource identified by `resource.id()`.
    async fn delete_resource(&self, resource: &ResourceNode) -> AppResult<()>;
}
