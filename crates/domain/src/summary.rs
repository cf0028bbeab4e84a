use serde::Serialize;

use crate::Outcome;

/// Counters accumulated over one walk of the inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Subscriptions entered.
    pub subscriptions_processed: u64,
    /// Resource groups entered.
    pub resource_groups_processed: u64,
    /// Resources evaluated.
    pub resources_checked: u64,
    /// Resources whose outcome was `DeleteNow`.
    pub resources_marked_for_deletion: u64,
    /// Resources whose retirement is deferred.
    pub resources_deferred: u64,
    /// Resources left untouched because their delete-by tag was unparseable.
    pub resources_aborted_unsafe: u64,
    /// Executor calls that completed.
    pub actions_succeeded: u64,
    /// Executor calls that failed.
    pub actions_failed: u64,
    /// Subscriptions or resource groups that could not be listed.
    pub scopes_failed: u64,
    /// Whether the walk stopped early on cancellation.
    pub interrupted: bool,
}

impl RunSummary {
    /// Counts one evaluated resource and its outcome.
    pub fn record_outcome(&mut self, outcome: Outcome) {
        self.resources_checked += 1;
        match outcome {
            Outcome::Skip => {}
            Outcome::DeleteNow => self.resources_marked_for_deletion += 1,
            Outcome::DeferUntil => self.resources_deferred += 1,
            Outcome::AbortUnsafe => self.resources_aborted_unsafe += 1,
        }
    }
}
