use serde::{Deserialize, Serialize};

use crate::ResourceTagSet;

/// One cloud resource as captured by the inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    id: String,
    name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    resource_type: Option<String>,
    #[serde(default)]
    tags: ResourceTagSet,
}

impl ResourceNode {
    /// Creates a resource node.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, tags: ResourceTagSet) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource_type: None,
            tags,
        }
    }

    /// Returns the fully qualified resource identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the provider resource type when known.
    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    /// Returns the resource tags.
    #[must_use]
    pub fn tags(&self) -> &ResourceTagSet {
        &self.tags
    }
}

/// Resource group and the resources it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupNode {
    name: String,
    #[serde(default)]
    resources: Vec<ResourceNode>,
}

impl ResourceGroupNode {
    /// Creates a resource group node.
    #[must_use]
    pub fn new(name: impl Into<String>, resources: Vec<ResourceNode>) -> Self {
        Self {
            name: name.into(),
            resources,
        }
    }

    /// Returns the resource group name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the resources of this group.
    #[must_use]
    pub fn resources(&self) -> &[ResourceNode] {
        &self.resources
    }
}

/// Subscription and its resource groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionNode {
    id: String,
    display_name: String,
    #[serde(default)]
    resource_groups: Vec<ResourceGroupNode>,
}

impl SubscriptionNode {
    /// Creates a subscription node.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        resource_groups: Vec<ResourceGroupNode>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            resource_groups,
        }
    }

    /// Returns the subscription identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the subscription display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the resource groups of this subscription.
    #[must_use]
    pub fn resource_groups(&self) -> &[ResourceGroupNode] {
        &self.resource_groups
    }

    /// Counts resources across every resource group.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resource_groups
            .iter()
            .map(|group| group.resources().len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionNode;

    #[test]
    fn inventory_tree_deserializes_with_optional_fields() {
        let subscription: SubscriptionNode = serde_json::from_str(
            r#"{
                "id": "sub-1",
                "display_name": "Sandbox",
                "resource_groups": [
                    {
                        "name": "rg-a",
                        "resources": [
                            {
                                "id": "/subscriptions/sub-1/resourceGroups/rg-a/providers/Microsoft.Web/sites/app",
                                "name": "app",
                                "type": "Microsoft.Web/sites",
                                "tags": { "env": "trash" }
                            },
                            { "id": "/subscriptions/sub-1/resourceGroups/rg-a/x", "name": "x" }
                        ]
                    },
                    { "name": "rg-empty" }
                ]
            }"#,
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(subscription.resource_count(), 2);
        let resources = subscription.resource_groups()[0].resources();
        assert_eq!(resources[0].resource_type(), Some("Microsoft.Web/sites"));
        assert!(resources[1].tags().is_empty());
        assert!(subscription.resource_groups()[1].resources().is_empty());
    }
}
