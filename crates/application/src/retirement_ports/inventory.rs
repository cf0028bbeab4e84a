use async_trait::async_trait;
use tagsweep_core::AppResult;
use tagsweep_domain::ResourceNode;

/// Subscription visible to the running identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSummary {
    /// Subscription identifier.
    pub id: String,
    /// Subscription display name.
    pub display_name: String,
}

/// Resource group listed under one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupSummary {
    /// Resource group name.
    pub name: String,
}

/// Port supplying the enumerated resource tree, one scope at a time.
///
/// Each call may fail independently so the walker can skip an unreachable
/// branch and keep going with its siblings.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// Lists subscriptions in inventory order.
    async fn list_subscriptions(&self) -> AppResult<Vec<SubscriptionSummary>>;

    /// Lists resource groups of one subscription.
    async fn list_resource_groups(
        &self,
        subscription_id: &str,
    ) -> AppResult<Vec<ResourceGroupSummary>>;

    /// Lists resources of one resource group.
    async fn list_resources(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
    ) -> AppResult<Vec<ResourceNode>>;
}
