use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tagsweep_core::{AppResult, NonEmptyString};

/// Comparison policy applied to tag keys and values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    /// Ordinal, byte-for-byte comparison.
    Sensitive,
    /// Culture-invariant comparison ignoring letter case.
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    /// Builds the policy from a `case_sensitive` flag.
    #[must_use]
    pub fn from_flag(case_sensitive: bool) -> Self {
        if case_sensitive {
            Self::Sensitive
        } else {
            Self::Insensitive
        }
    }

    /// Returns whether two strings are equal under this policy.
    #[must_use]
    pub fn equals(self, left: &str, right: &str) -> bool {
        match self {
            Self::Sensitive => left == right,
            Self::Insensitive => {
                left == right
                    || left
                        .chars()
                        .flat_map(char::to_lowercase)
                        .eq(right.chars().flat_map(char::to_lowercase))
            }
        }
    }

    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sensitive => "case_sensitive",
            Self::Insensitive => "case_insensitive",
        }
    }
}

/// Tags attached to one resource, with keys kept exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTagSet(BTreeMap<String, String>);

impl ResourceTagSet {
    /// Creates an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under the exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Finds the stored key equal to `key` under `sensitivity`, in its original case.
    ///
    /// When several stored keys differ only by case, the first one in key
    /// order wins.
    #[must_use]
    pub fn find_key(&self, key: &str, sensitivity: CaseSensitivity) -> Option<&str> {
        if let Some((stored_key, _)) = self.0.get_key_value(key) {
            return Some(stored_key.as_str());
        }

        match sensitivity {
            CaseSensitivity::Sensitive => None,
            CaseSensitivity::Insensitive => self
                .0
                .keys()
                .find(|stored_key| sensitivity.equals(stored_key, key))
                .map(String::as_str),
        }
    }

    /// Iterates tag pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the resource carries no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ResourceTagSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Target tag pair a resource must carry to become a retirement candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    key: NonEmptyString,
    value: String,
    sensitivity: CaseSensitivity,
}

impl TagRule {
    /// Creates a validated tag rule.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        sensitivity: CaseSensitivity,
    ) -> AppResult<Self> {
        Ok(Self {
            key: NonEmptyString::new(key)?,
            value: value.into(),
            sensitivity,
        })
    }

    /// Returns the target tag key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the target tag value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Returns the comparison policy of this rule.
    #[must_use]
    pub fn sensitivity(&self) -> CaseSensitivity {
        self.sensitivity
    }

    /// Returns the first tag pair of `tags` that satisfies the rule.
    #[must_use]
    pub fn matching_pair<'a>(&self, tags: &'a ResourceTagSet) -> Option<(&'a str, &'a str)> {
        tags.iter().find(|(key, value)| {
            self.sensitivity.equals(key, self.key())
                && self.sensitivity.equals(value, self.value())
        })
    }

    /// Returns whether `tags` carries the target pair.
    #[must_use]
    pub fn matches(&self, tags: &ResourceTagSet) -> bool {
        self.matching_pair(tags).is_some()
    }
}

impl std::fmt::Display for TagRule {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "<{}:{}> ({})",
            self.key,
            self.value,
            self.sensitivity.as_str()
        )
    }
}
