use std::sync::Arc;

use async_trait::async_trait;
use tagsweep_application::{ActionExecutor, ResourceDeleter};
use tagsweep_core::{AppError, AppResult};
use tagsweep_domain::{ExecutionMode, ResourceNode};
use tracing::info;

/// Action executor dispatching on the execution mode.
///
/// `Audit` only logs. `Notify` logs a notification stub until a delivery
/// channel exists. `Delete` hands the resource to the configured deleter.
#[derive(Clone, Default)]
pub struct ModeActionExecutor {
    deleter: Option<Arc<dyn ResourceDeleter>>,
}

impl ModeActionExecutor {
    /// Creates an executor without a deleter; `Delete` mode will fail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the deleter used in `Delete` mode.
    #[must_use]
    pub fn with_deleter(mut self, deleter: Arc<dyn ResourceDeleter>) -> Self {
        self.deleter = Some(deleter);
        self
    }
}

#[async_trait]
impl ActionExecutor for ModeActionExecutor {
    async fn execute(&self, mode: ExecutionMode, resource: &ResourceNode) -> AppResult<()> {
        match mode {
            ExecutionMode::Audit => {
                info!(
                    resource_id = resource.id(),
                    resource_name = resource.name(),
                    "audit mode: resource would be retired"
                );
                Ok(())
            }
            ExecutionMode::Notify => {
                info!(
                    resource_id = resource.id(),
                    resource_name = resource.name(),
                    "notify mode: retirement notification recorded"
                );
                Ok(())
            }
            ExecutionMode::Delete => {
                let deleter = self.deleter.as_ref().ok_or_else(|| {
                    AppError::Validation("delete mode requires a resource deleter".to_owned())
                })?;
                deleter.delete_resource(resource).await?;
                info!(
                    resource_id = resource.id(),
                    resource_name = resource.name(),
                    "resource deleted"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tagsweep_application::{ActionExecutor, ResourceDeleter};
    use tagsweep_core::{AppError, AppResult};
    use tagsweep_domain::{ExecutionMode, ResourceNode, ResourceTagSet};
    use tokio::sync::Mutex;

    use super::ModeActionExecutor;

    #[derive(Default)]
    struct FakeResourceDeleter {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResourceDeleter for FakeResourceDeleter {
        async fn delete_resource(&self, resource: &ResourceNode) -> AppResult<()> {
            self.deleted.lock().await.push(resource.id().to_owned());
            Ok(())
        }
    }

    fn resource() -> ResourceNode {
        ResourceNode::new("/resources/app", "app", ResourceTagSet::new())
    }

    #[tokio::test]
    async fn only_delete_mode_reaches_the_deleter() {
        let deleter = Arc::new(FakeResourceDeleter::default());
        let executor = ModeActionExecutor::new().with_deleter(deleter.clone());

        for mode in [
            ExecutionMode::Audit,
            ExecutionMode::Notify,
            ExecutionMode::Delete,
        ] {
            assert!(executor.execute(mode, &resource()).await.is_ok());
        }

        assert_eq!(
            deleter.deleted.lock().await.clone(),
            vec!["/resources/app".to_owned()]
        );
    }

    #[tokio::test]
    async fn delete_mode_without_deleter_fails() {
        let result = ModeActionExecutor::new()
            .execute(ExecutionMode::Delete, &resource())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
