use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tagsweep_core::{AppError, AppResult, NonEmptyString};

use crate::{DateFormat, ResourceNode, TagRule};

/// Tag key checked when none is configured.
pub const DEFAULT_TARGET_TAG_KEY: &str = "env";

/// Tag value checked when none is configured.
pub const DEFAULT_TARGET_TAG_VALUE: &str = "trash";

/// Deferral tag key used when none is configured.
pub const DEFAULT_DELETE_BY_TAG_KEY: &str = "DeleteBy";

/// Enforcement applied to resources that are due for retirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Record the decision only.
    #[default]
    Audit,
    /// Notify resource owners; currently a logged stub.
    Notify,
    /// Delete the resource.
    Delete,
}

impl ExecutionMode {
    /// Returns a stable label for logs and audit records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::Notify => "notify",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        [Self::Audit, Self::Notify, Self::Delete]
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| AppError::Validation(format!("unknown execution mode '{value}'")))
    }
}

impl Display for ExecutionMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Immutable rule set applied to every resource of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetirementPolicy {
    tag_rule: TagRule,
    delete_by_tag_key: String,
    date_format: DateFormat,
    mode: ExecutionMode,
}

impl RetirementPolicy {
    /// Creates a validated retirement policy.
    pub fn new(
        tag_rule: TagRule,
        delete_by_tag_key: impl Into<String>,
        date_format: DateFormat,
        mode: ExecutionMode,
    ) -> AppResult<Self> {
        let delete_by_tag_key = NonEmptyString::new(delete_by_tag_key)
            .map_err(|_| AppError::Validation("delete-by tag key must not be empty".to_owned()))?
            .into();

        Ok(Self {
            tag_rule,
            delete_by_tag_key,
            date_format,
            mode,
        })
    }

    /// Creates a policy for `tag_rule` with the default deferral tag, date
    /// format and `Audit` mode.
    #[must_use]
    pub fn with_defaults(tag_rule: TagRule) -> Self {
        Self {
            tag_rule,
            delete_by_tag_key: DEFAULT_DELETE_BY_TAG_KEY.to_owned(),
            date_format: DateFormat::default(),
            mode: ExecutionMode::Audit,
        }
    }

    /// Returns a copy of this policy running under `mode`.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the target tag rule.
    #[must_use]
    pub fn tag_rule(&self) -> &TagRule {
        &self.tag_rule
    }

    /// Returns the deferral tag key.
    #[must_use]
    pub fn delete_by_tag_key(&self) -> &str {
        self.delete_by_tag_key.as_str()
    }

    /// Returns the deferral date format.
    #[must_use]
    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    /// Returns the enforcement mode.
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

/// Outcome of evaluating one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The resource does not carry the target tag.
    Skip,
    /// The resource is due for retirement.
    DeleteNow,
    /// The resource is a candidate whose delete-by date lies in the future.
    DeferUntil,
    /// The delete-by tag could not be parsed; the resource is left untouched.
    AbortUnsafe,
}

impl Outcome {
    /// Returns a stable label for logs and audit records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::DeleteNow => "delete_now",
            Self::DeferUntil => "defer_until",
            Self::AbortUnsafe => "abort_unsafe",
        }
    }
}

/// Auditable decision taken for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Computed outcome.
    pub outcome: Outcome,
    /// Resource the decision applies to.
    pub resource: ResourceNode,
    /// Human-readable explanation of the outcome.
    pub reason: String,
    /// Parsed delete-by date, when the resource carried one.
    pub delete_by: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ExecutionMode, RetirementPolicy};
    use crate::{CaseSensitivity, DateFormat, TagRule};

    #[test]
    fn execution_mode_parses_ignoring_case() {
        assert_eq!(
            ExecutionMode::from_str(" DELETE ").unwrap_or_else(|_| unreachable!()),
            ExecutionMode::Delete
        );
        assert_eq!(
            ExecutionMode::from_str("notify").unwrap_or_else(|_| unreachable!()),
            ExecutionMode::Notify
        );
        assert!(ExecutionMode::from_str("purge").is_err());
        assert_eq!(ExecutionMode::default(), ExecutionMode::Audit);
    }

    #[test]
    fn policy_rejects_blank_delete_by_key() {
        let rule = TagRule::new("env", "trash", CaseSensitivity::Insensitive)
            .unwrap_or_else(|_| unreachable!());

        let result = RetirementPolicy::new(rule, " ", DateFormat::default(), ExecutionMode::Audit);
        assert!(result.is_err());
    }

    #[test]
    fn default_policy_uses_delete_by_tag_and_audit_mode() {
        let rule = TagRule::new("env", "trash", CaseSensitivity::Insensitive)
            .unwrap_or_else(|_| unreachable!());
        let policy = RetirementPolicy::with_defaults(rule);

        assert_eq!(policy.delete_by_tag_key(), "DeleteBy");
        assert_eq!(policy.date_format().as_str(), "dd/MM/yyyy");
        assert_eq!(policy.mode(), ExecutionMode::Audit);
    }
}
