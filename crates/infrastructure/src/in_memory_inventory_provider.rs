use std::path::Path;

use async_trait::async_trait;
use tagsweep_application::{InventoryProvider, ResourceGroupSummary, SubscriptionSummary};
use tagsweep_core::{AppError, AppResult};
use tagsweep_domain::{ResourceNode, SubscriptionNode};

/// Inventory provider backed by an already enumerated resource tree.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryProvider {
    subscriptions: Vec<SubscriptionNode>,
}

impl InMemoryInventoryProvider {
    /// Creates a provider over an in-memory snapshot.
    #[must_use]
    pub fn new(subscriptions: Vec<SubscriptionNode>) -> Self {
        Self { subscriptions }
    }

    /// Parses a JSON array of subscriptions.
    pub fn from_json_str(payload: &str) -> AppResult<Self> {
        serde_json::from_str::<Vec<SubscriptionNode>>(payload)
            .map(Self::new)
            .map_err(|error| {
                AppError::Validation(format!("invalid inventory snapshot: {error}"))
            })
    }

    /// Reads a JSON inventory snapshot from disk.
    pub async fn load_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let payload = tokio::fs::read_to_string(path).await.map_err(|error| {
            AppError::Unavailable(format!(
                "failed to read inventory snapshot '{}': {error}",
                path.display()
            ))
        })?;

        Self::from_json_str(payload.as_str())
    }

    fn find_subscription(&self, subscription_id: &str) -> AppResult<&SubscriptionNode> {
        self.subscriptions
            .iter()
            .find(|subscription| subscription.id() == subscription_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "subscription '{subscription_id}' is not part of the inventory"
                ))
            })
    }
}

#[async_trait]
impl InventoryProvider for InMemoryInventoryProvider {
    async fn list_subscriptions(&self) -> AppResult<Vec<SubscriptionSummary>> {
        Ok(self
            .subscriptions
            .iter()
            .map(|subscription| SubscriptionSummary {
                id: subscription.id().to_owned(),
                display_name: subscription.display_name().to_owned(),
            })
            .collect())
    }

    async fn list_resource_groups(
        &self,
        subscription_id: &str,
    ) -> AppResult<Vec<ResourceGroupSummary>> {
        Ok(self
            .find_subscription(subscription_id)?
            .resource_groups()
            .iter()
            .map(|resource_group| ResourceGroupSummary {
                name: resource_group.name().to_owned(),
            })
            .collect())
    }

    async fn list_resources(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
    ) -> AppResult<Vec<ResourceNode>> {
        self.find_subscription(subscription_id)?
            .resource_groups()
            .iter()
            .find(|resource_group| resource_group.name() == resource_group_name)
            .map(|resource_group| resource_group.resources().to_vec())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "resource group '{resource_group_name}' is not part of subscription '{subscription_id}'"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use tagsweep_application::InventoryProvider;
    use tagsweep_core::AppError;

    use super::InMemoryInventoryProvider;

    const SNAPSHOT: &str = r#"[
        {
            "id": "sub-a",
            "display_name": "Sandbox",
            "resource_groups": [
                {
                    "name": "rg-web",
                    "resources": [
                        { "id": "/subscriptions/sub-a/resourceGroups/rg-web/providers/Microsoft.Web/sites/app", "name": "app", "tags": { "env": "trash" } }
                    ]
                }
            ]
        },
        { "id": "sub-b", "display_name": "Shared" }
    ]"#;

    #[tokio::test]
    async fn lists_scopes_from_json_snapshot() {
        let provider =
            InMemoryInventoryProvider::from_json_str(SNAPSHOT).unwrap_or_else(|_| unreachable!());

        let subscriptions = provider
            .list_subscriptions()
            .await
            .unwrap_or_else(|_| unreachable!());
        let ids: Vec<&str> = subscriptions.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["sub-a", "sub-b"]);

        let groups = provider
            .list_resource_groups("sub-a")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(groups.len(), 1);

        let resources = provider
            .list_resources("sub-a", "rg-web")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(resources[0].tags().get("env"), Some("trash"));

        assert!(
            provider
                .list_resource_groups("sub-b")
                .await
                .unwrap_or_else(|_| unreachable!())
                .is_empty()
        );
    }

    #[tokio::test]
    async fn unknown_scopes_are_not_found() {
        let provider =
            InMemoryInventoryProvider::from_json_str(SNAPSHOT).unwrap_or_else(|_| unreachable!());

        assert!(matches!(
            provider.list_resource_groups("sub-x").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            provider.list_resources("sub-a", "rg-x").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn malformed_snapshot_is_rejected() {
        assert!(InMemoryInventoryProvider::from_json_str(r#"{"id":"sub-a"}"#).is_err());
    }

    #[tokio::test]
    async fn missing_snapshot_file_is_unavailable() {
        let result =
            InMemoryInventoryProvider::load_json_file("/nonexistent/tagsweep/inventory.json").await;

        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }
}
