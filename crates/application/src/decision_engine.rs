use chrono::{DateTime, Utc};
use tagsweep_domain::{Decision, Outcome, ResourceNode, RetirementPolicy};

use crate::deferred_deletion::{DeferredVerdict, resolve_deferred_deletion};

/// Decides what happens to one resource under a policy.
pub trait RetirementDecider: Send + Sync {
    /// Computes the decision for `resource` at the instant `now`.
    fn decide(
        &self,
        resource: &ResourceNode,
        policy: &RetirementPolicy,
        now: DateTime<Utc>,
    ) -> Decision;
}

/// Tag-driven retirement state machine.
///
/// A resource without the target tag is skipped. A tagged resource whose
/// delete-by tag cannot be parsed is aborted for safety. Otherwise it is
/// deferred while its delete-by date lies strictly in the future and due
/// from that instant on; a missing delete-by tag means due immediately.
/// The execution mode is only reported, never consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetirementDecisionEngine;

impl RetirementDecisionEngine {
    /// Creates the decision engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RetirementDecider for RetirementDecisionEngine {
    fn decide(
        &self,
        resource: &ResourceNode,
        policy: &RetirementPolicy,
        now: DateTime<Utc>,
    ) -> Decision {
        let rule = policy.tag_rule();
        let Some((matched_key, matched_value)) = rule.matching_pair(resource.tags()) else {
            return Decision {
                outcome: Outcome::Skip,
                resource: resource.clone(),
                reason: format!("tag rule {rule} not satisfied"),
                delete_by: None,
            };
        };
        let matched = format!("tag <{matched_key}:{matched_value}> satisfies rule {rule}");

        let verdict = resolve_deferred_deletion(
            resource.tags(),
            policy.delete_by_tag_key(),
            policy.date_format(),
            rule.sensitivity(),
        );

        let (effective_date, delete_by, deferral) = match verdict {
            DeferredVerdict::UnparseableDate {
                tag_key,
                raw_value,
                error,
            } => {
                return Decision {
                    outcome: Outcome::AbortUnsafe,
                    resource: resource.clone(),
                    reason: format!(
                        "{matched}; delete-by tag '{tag_key}' value '{raw_value}' is unparseable \
                         ({error}); resource is NOT retired, for safety (mode {})",
                        policy.mode()
                    ),
                    delete_by: None,
                };
            }
            DeferredVerdict::NoDeferralTag => (
                DateTime::<Utc>::MIN_UTC,
                None,
                format!("no '{}' tag", policy.delete_by_tag_key()),
            ),
            DeferredVerdict::ParsedDate {
                tag_key,
                raw_value,
                date,
            } => (
                date,
                Some(date),
                format!("delete-by tag '{tag_key}' = '{raw_value}' ({})", date.to_rfc3339()),
            ),
        };

        if effective_date > now {
            Decision {
                outcome: Outcome::DeferUntil,
                resource: resource.clone(),
                reason: format!(
                    "{matched}; {deferral} lies in the future; retirement deferred (mode {})",
                    policy.mode()
                ),
                delete_by,
            }
        } else {
            Decision {
                outcome: Outcome::DeleteNow,
                resource: resource.clone(),
                reason: format!(
                    "{matched}; {deferral}; retirement rule satisfied and due (mode {})",
                    policy.mode()
                ),
                delete_by,
            }
        }
    }
}
