use std::collections::BTreeSet;

use tagsweep_core::{AppError, AppResult};
use tagsweep_domain::CaseSensitivity;

use crate::retirement_ports::SubscriptionSummary;

/// Allow-lists restricting which part of the inventory a run walks.
///
/// Empty lists mean "everything". Subscription ids and resource-group
/// names are compared ignoring case, as the cloud provider does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunScope {
    subscription_ids: BTreeSet<String>,
    resource_group_names: BTreeSet<String>,
    require_subscription_ids: bool,
}

impl RunScope {
    /// Creates a scope covering the whole inventory.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a scope from raw allow-list entries; blank entries are dropped.
    #[must_use]
    pub fn new<S, G>(subscription_ids: S, resource_group_names: G) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        Self {
            subscription_ids: normalize(subscription_ids),
            resource_group_names: normalize(resource_group_names),
            require_subscription_ids: false,
        }
    }

    /// Makes the run fail unless explicit subscriptions are configured and found.
    #[must_use]
    pub fn requiring_subscription_ids(mut self) -> Self {
        self.require_subscription_ids = true;
        self
    }

    /// Returns the configured subscription ids.
    pub fn subscription_ids(&self) -> impl Iterator<Item = &str> {
        self.subscription_ids.iter().map(String::as_str)
    }

    /// Returns the configured resource group names.
    pub fn resource_group_names(&self) -> impl Iterator<Item = &str> {
        self.resource_group_names.iter().map(String::as_str)
    }

    /// Validates the scope before anything is listed.
    pub fn validate(&self) -> AppResult<()> {
        if self.require_subscription_ids && self.subscription_ids.is_empty() {
            return Err(AppError::Validation(
                "explicit subscription ids are required but none were configured".to_owned(),
            ));
        }

        Ok(())
    }

    /// Returns whether a resource group is part of the scope.
    #[must_use]
    pub fn includes_resource_group(&self, name: &str) -> bool {
        contains(&self.resource_group_names, name)
    }

    /// Keeps the listed subscriptions that are in scope, in listing order.
    ///
    /// Configured ids missing from the listing are returned alongside so
    /// the caller can report them. Fails when subscriptions were explicitly
    /// selected but none of them exists, so a scoped run never silently
    /// walks nothing.
    pub fn resolve_subscriptions(
        &self,
        listed: Vec<SubscriptionSummary>,
    ) -> AppResult<ResolvedSubscriptions> {
        self.validate()?;

        let selected: Vec<SubscriptionSummary> = listed
            .into_iter()
            .filter(|subscription| contains(&self.subscription_ids, subscription.id.as_str()))
            .collect();

        if !self.subscription_ids.is_empty() && selected.is_empty() {
            return Err(AppError::Validation(format!(
                "none of the configured subscription ids ({}) is visible in the inventory",
                self.subscription_ids
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let unresolved = self
            .subscription_ids
            .iter()
            .filter(|configured| {
                !selected.iter().any(|subscription| {
                    CaseSensitivity::Insensitive.equals(configured, subscription.id.as_str())
                })
            })
            .cloned()
            .collect();

        Ok(ResolvedSubscriptions {
            selected,
            unresolved,
        })
    }
}

/// Outcome of matching the configured subscription ids against the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubscriptions {
    /// Subscriptions to walk, in listing order.
    pub selected: Vec<SubscriptionSummary>,
    /// Configured ids with no listed subscription.
    pub unresolved: Vec<String>,
}

fn normalize<I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().trim().to_owned())
        .filter(|value| !value.is_empty())
        .collect()
}

fn contains(allow_list: &BTreeSet<String>, candidate: &str) -> bool {
    allow_list.is_empty()
        || allow_list
            .iter()
            .any(|allowed| CaseSensitivity::Insensitive.equals(allowed, candidate))
}

#[cfg(test)]
mod tests {
    use super::RunScope;
    use crate::retirement_ports::SubscriptionSummary;

    fn listed(ids: &[&str]) -> Vec<SubscriptionSummary> {
        ids.iter()
            .map(|id| SubscriptionSummary {
                id: (*id).to_owned(),
                display_name: format!("Subscription {id}"),
            })
            .collect()
    }

    #[test]
    fn empty_scope_keeps_every_subscription_in_order() {
        let resolved = RunScope::all()
            .resolve_subscriptions(listed(&["b", "a", "c"]))
            .unwrap_or_else(|_| unreachable!());

        let ids: Vec<&str> = resolved
            .selected
            .iter()
            .map(|entry| entry.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert!(resolved.unresolved.is_empty());
    }

    #[test]
    fn selected_subscriptions_keep_inventory_order() {
        let scope = RunScope::new([" C ", "a", ""], Vec::<String>::new());
        let resolved = scope
            .resolve_subscriptions(listed(&["A", "b", "c"]))
            .unwrap_or_else(|_| unreachable!());

        let ids: Vec<&str> = resolved
            .selected
            .iter()
            .map(|entry| entry.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "c"]);
        assert!(resolved.unresolved.is_empty());
    }

    #[test]
    fn partially_resolved_selection_reports_missing_ids() {
        let scope = RunScope::new(["a", "typo", "B"], Vec::<String>::new());
        let resolved = scope
            .resolve_subscriptions(listed(&["a", "b", "c"]))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(resolved.selected.len(), 2);
        assert_eq!(resolved.unresolved, vec!["typo".to_owned()]);
    }

    #[test]
    fn unresolved_selection_fails_fast() {
        let scope = RunScope::new(["missing"], Vec::<String>::new());

        assert!(scope.resolve_subscriptions(listed(&["a", "b"])).is_err());
    }

    #[test]
    fn required_selection_must_be_configured() {
        let scope = RunScope::new(["", " "], Vec::<String>::new()).requiring_subscription_ids();

        assert!(scope.validate().is_err());
        assert!(scope.resolve_subscriptions(listed(&["a"])).is_err());
    }

    #[test]
    fn resource_groups_match_ignoring_case() {
        let scope = RunScope::new(Vec::<String>::new(), ["RG-Sandbox"]);

        assert!(scope.includes_resource_group("rg-sandbox"));
        assert!(!scope.includes_resource_group("rg-prod"));
        assert!(RunScope::all().includes_resource_group("anything"));
    }
}
